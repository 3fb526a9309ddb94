//! An Intcode interpreter for the 2019 Advent of Code, and the noun/verb
//! search that day two's puzzle drives it with.

pub mod intcode;
pub mod search;
pub mod store;
