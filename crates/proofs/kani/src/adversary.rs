//! Adversarial step generator

#[cfg(kani)]
use kani::any;

#[cfg(kani)]
use crate::generators::Scenario;

#[derive(Clone, Copy)]
pub enum Step {
    Credit,
    Withdraw,
    Arm,
    Disarm,
    Attack,
    Transfer,
}

#[cfg(kani)]
impl kani::Arbitrary for Step {
    fn any() -> Self {
        let choice: u8 = any();
        match choice % 6 {
            0 => Step::Credit,
            1 => Step::Withdraw,
            2 => Step::Arm,
            3 => Step::Disarm,
            4 => Step::Attack,
            _ => Step::Transfer,
        }
    }
}

/// Apply one arbitrary operation. Failures are discarded the way a real
/// caller would observe-and-ignore them; the proofs assert on state, not
/// on which calls happened to succeed.
#[cfg(kani)]
pub fn adversary_step(s: &mut Scenario) {
    use crate::generators::{any_amount, any_recipient};

    let party = any_recipient(s);
    match any::<Step>() {
        Step::Credit => {
            let _ = s.vm.credit(s.escrow, s.funder, party, any_amount());
        }
        Step::Withdraw => {
            let _ = s.vm.withdraw(s.escrow, party);
        }
        Step::Arm => {
            let _ = s.vm.arm(party, s.escrow);
        }
        Step::Disarm => {
            let _ = s.vm.disarm(party);
        }
        Step::Attack => {
            let _ = s.vm.attack(party);
        }
        Step::Transfer => {
            let _ = s.vm.transfer(s.funder, party, any_amount());
        }
    }
}
