use advent_of_code_2019::intcode::{Interpreter, NOUN, VERB};
use advent_of_code_2019::search::{find_inputs, Inputs};
use advent_of_code_2019::store::{ProgramStore, Word};
use failure::{format_err, Error};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// The output part two asks for.
const TARGET: Word = 19690720;

/// Restore the program to its "1202 program alarm" state and return what it
/// leaves in position 0.
fn part_one(store: &ProgramStore, trace: bool) -> Result<Word, Error> {
    let mut interp = Interpreter::with_patches(store.clone(), &[(NOUN, 12), (VERB, 2)]);
    interp.set_trace(trace);
    interp.run()?;
    Ok(interp.read(0)?)
}

/// Find the inputs that make the program produce `TARGET`.
fn part_two(store: &ProgramStore, trace: bool) -> Result<Inputs, Error> {
    let mut interp = Interpreter::new(store.clone());
    interp.set_trace(trace);
    Ok(find_inputs(&mut interp, TARGET)?)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let store = ProgramStore::from_reader(std::io::stdin())?;
    let trace = tracing::enabled!(Level::TRACE);

    println!("Part one: {}", part_one(&store, trace)?);
    let inputs = part_two(&store, trace)?;
    let code = inputs
        .code()
        .ok_or_else(|| format_err!("inputs too large to encode: {:?}", inputs))?;
    println!("noun {} and verb {} produce {}", inputs.noun, inputs.verb, TARGET);
    println!("Part two: {}", code);

    Ok(())
}
