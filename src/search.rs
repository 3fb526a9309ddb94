//! Brute-force search for the noun and verb that make a day-two program
//! produce a given output.
//!
//! Each trial reuses one interpreter: reset memory, patch the inputs, run,
//! and read cell 0. Trials that fault simply don't match.

use crate::intcode::{Fault, Interpreter};
use crate::store::{OutOfBounds, Word};
use failure::Fail;
use itertools::iproduct;
use std::ops::RangeInclusive;
use tracing::debug;

/// The values the noun and the verb each range over.
pub const INPUT_RANGE: RangeInclusive<Word> = 0..=99;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Inputs {
    pub noun: Word,
    pub verb: Word,
}

impl Inputs {
    /// The puzzle's encoding of a noun/verb pair as a single number, or
    /// `None` if it doesn't fit in a `Word`.
    pub fn code(&self) -> Option<Word> {
        self.noun.checked_mul(100)?.checked_add(self.verb)
    }
}

#[derive(Debug, Fail, PartialEq)]
pub enum TrialError {
    #[fail(display = "couldn't patch inputs: {}", _0)]
    Patch(#[fail(cause)] OutOfBounds),

    #[fail(display = "{}", _0)]
    Fault(#[fail(cause)] Fault),
}

impl From<OutOfBounds> for TrialError {
    fn from(err: OutOfBounds) -> TrialError {
        TrialError::Patch(err)
    }
}

impl From<Fault> for TrialError {
    fn from(fault: Fault) -> TrialError {
        TrialError::Fault(fault)
    }
}

#[derive(Debug, Fail, PartialEq)]
pub enum SearchError {
    #[fail(display = "no noun/verb pair produces {}", _0)]
    NoMatch(Word),

    #[fail(display = "more than one noun/verb pair produces {}", target)]
    Ambiguous { target: Word, matches: Vec<Inputs> },
}

/// Run `interp`'s program from its loaded state with `inputs` patched in, and
/// return the value left in cell 0.
pub fn trial(interp: &mut Interpreter, inputs: Inputs) -> Result<Word, TrialError> {
    interp.reset();
    interp.set_inputs(inputs.noun, inputs.verb)?;
    interp.run()?;
    Ok(interp.read(0)?)
}

/// Iterate over every pair of inputs, in order of noun and then verb, for
/// which the program leaves `target` in cell 0.
pub fn matching_inputs<'a>(
    interp: &'a mut Interpreter,
    target: Word,
) -> impl Iterator<Item = Inputs> + 'a {
    iproduct!(INPUT_RANGE, INPUT_RANGE)
        .map(|(noun, verb)| Inputs { noun, verb })
        .filter(move |&inputs| match trial(&mut *interp, inputs) {
            Ok(output) => output == target,
            Err(err) => {
                debug!(?inputs, %err, "trial failed");
                false
            }
        })
}

/// Find the one pair of inputs that produces `target`.
pub fn find_inputs(interp: &mut Interpreter, target: Word) -> Result<Inputs, SearchError> {
    let matches = matching_inputs(interp, target).collect::<Vec<_>>();
    match matches.len() {
        0 => Err(SearchError::NoMatch(target)),
        1 => Ok(matches[0]),
        _ => Err(SearchError::Ambiguous { target, matches }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    static INPUT: &str = include_str!("bin/day-02.input");

    fn day_two() -> Interpreter {
        Interpreter::parse(INPUT, &[]).expect("puzzle input should parse")
    }

    #[test]
    fn test_trial() {
        let mut interp = day_two();
        assert_eq!(trial(&mut interp, Inputs { noun: 12, verb: 2 }), Ok(9706670));

        // Trials don't disturb each other.
        trial(&mut interp, Inputs { noun: 99, verb: 99 }).unwrap();
        assert_eq!(trial(&mut interp, Inputs { noun: 12, verb: 2 }), Ok(9706670));
    }

    #[test]
    fn test_find_inputs() {
        let mut interp = day_two();
        let inputs = find_inputs(&mut interp, 19690720).unwrap();
        assert_eq!(inputs, Inputs { noun: 25, verb: 52 });
        assert_eq!(inputs.code(), Some(2552));
    }

    #[test]
    fn test_code_overflow() {
        let inputs = Inputs { noun: Word::max_value(), verb: 0 };
        assert_eq!(inputs.code(), None);
        let inputs = Inputs { noun: Word::max_value() / 100, verb: Word::max_value() };
        assert_eq!(inputs.code(), None);
        assert_eq!(Inputs { noun: 0, verb: 7 }.code(), Some(7));
    }

    #[test]
    fn test_no_match() {
        let mut interp = day_two();
        assert_eq!(find_inputs(&mut interp, -1), Err(SearchError::NoMatch(-1)));
    }

    #[test]
    fn test_ambiguous() {
        // Cell 0 is always 99, whatever the inputs.
        let mut interp = Interpreter::parse("99,0,0", &[]).unwrap();
        match find_inputs(&mut interp, 99) {
            Err(SearchError::Ambiguous { target, matches }) => {
                assert_eq!(target, 99);
                assert_eq!(matches.len(), 100 * 100);
                assert_eq!(matches[0], Inputs { noun: 0, verb: 0 });
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_faulting_trials_are_skipped() {
        // Any input above 4 is out of bounds, so nearly every trial faults.
        let mut interp = Interpreter::parse("1,0,0,0,99", &[]).unwrap();
        assert_eq!(
            find_inputs(&mut interp, 198),
            Ok(Inputs { noun: 4, verb: 4 })
        );
        assert_eq!(
            trial(&mut interp, Inputs { noun: 5, verb: 0 })
                .err()
                .map(|err| err.to_string()),
            Some("fault at position 0 executing add 5 0 0: source position 5 is out of bounds".to_string())
        );
    }

    #[test]
    fn test_too_short_for_inputs() {
        let mut interp = Interpreter::parse("99,0", &[]).unwrap();
        assert_eq!(
            trial(&mut interp, Inputs { noun: 0, verb: 0 }),
            Err(TrialError::Patch(OutOfBounds { index: 2, len: 2 }))
        );
        // The failed verb patch is harmless; the noun went in.
        assert!(interp.is_ready());
        assert_eq!(find_inputs(&mut interp, 99), Err(SearchError::NoMatch(99)));
    }
}
