//! Handlers for plain values, strings and counted scalar arrays

use crate::cli::{FactorialArgs, FibArgs, GreetArgs, RepeatArgs};
use crate::error::Result;
use crate::output::OutputWriter;
use handoff_marshal::Marshaller;
use tracing::{debug, instrument};

/// Handle the factorial command
#[instrument(skip(marshaller, output))]
pub fn handle_factorial(args: FactorialArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let value = marshaller.factorial(args.n);
    if value == 0 {
        output.warning(&format!("{}! is undefined or does not fit in 32 bits", args.n))?;
    }
    output.data(&value)
}

/// Handle the greet command
#[instrument(skip(marshaller, output))]
pub fn handle_greet(args: GreetArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let greeting = marshaller.greet(&args.name)?;
    output.data(&greeting.trim_end().to_string())
}

/// Handle the fib command
#[instrument(skip(marshaller, output))]
pub fn handle_fib(args: FibArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let numbers = marshaller.fib_sequence(args.n)?;
    debug!(count = numbers.len(), "fibonacci sequence received");
    output.list(&numbers)
}

/// Handle the repeat command
#[instrument(skip(marshaller, output))]
pub fn handle_repeat(args: RepeatArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let copies = marshaller.multiply_string(&args.text, args.count)?;
    output.list(&copies)
}
