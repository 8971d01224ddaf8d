use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use lpplot_core::{ConstraintInput, ObjectiveSpec, Sense};

pub const MIN_CONSTRAINTS: usize = 2;
pub const MAX_CONSTRAINTS: usize = 4;

/// Line-oriented question/answer session over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")?;
        Ok(())
    }

    /// One trimmed line; end of input is an error.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("Reading from stdin")?;
        if read == 0 {
            bail!("input ended while waiting for: {}", question.trim_end());
        }
        Ok(line.trim().to_string())
    }

    /// Re-ask until the answer parses as `T` and passes `accept`.
    pub fn ask_valid<T: FromStr>(
        &mut self,
        question: &str,
        accept: impl Fn(&T) -> bool,
        retry: &str,
    ) -> Result<T> {
        loop {
            let answer = self.ask(question)?;
            match answer.parse::<T>() {
                Ok(value) if accept(&value) => return Ok(value),
                _ => self.say(retry)?,
            }
        }
    }

    pub fn ask_number(&mut self, question: &str) -> Result<f64> {
        self.ask_valid(question, |v: &f64| v.is_finite(), "Please enter a number.")
    }

    pub fn objective(&mut self) -> Result<ObjectiveSpec> {
        let sense = Sense::from_token(&self.ask("Enter objective (max or min): ")?);
        let coeff_x = self.ask_number("Enter coefficient of x in the objective function: ")?;
        let coeff_y = self.ask_number("Enter coefficient of y in the objective function: ")?;
        Ok(ObjectiveSpec::new(coeff_x, coeff_y, sense))
    }

    pub fn constraints(&mut self) -> Result<Vec<ConstraintInput>> {
        let count = self.ask_valid(
            "Enter number of constraints (2 to 4): ",
            |n: &usize| (MIN_CONSTRAINTS..=MAX_CONSTRAINTS).contains(n),
            "Please enter a valid number of constraints (2 to 4).",
        )?;

        let mut inputs = Vec::with_capacity(count);
        for i in 0..count {
            self.say(&format!("\nConstraint {}: a₁x + b₁y ≤/≥ c₁", i + 1))?;
            let coeff_x = self.ask_number("Enter coefficient of x: ")?;
            let coeff_y = self.ask_number("Enter coefficient of y: ")?;
            let relation = self.ask("Enter inequality sign (<= or >=): ")?;
            let rhs = self.ask_number("Enter right-hand side value: ")?;
            inputs.push(ConstraintInput::new(coeff_x, coeff_y, relation, rhs));
        }
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_full_session() {
        let script = "max\n3\n5\n3\n1\n2\n<=\n14\n3\n-1\n>=\n0\n1\n-1\n<=\n2\n";
        let mut prompter = session(script);

        let objective = prompter.objective().unwrap();
        assert_eq!(objective, ObjectiveSpec::maximize(3.0, 5.0));

        let inputs = prompter.constraints().unwrap();
        assert_eq!(
            inputs,
            vec![
                ConstraintInput::new(1.0, 2.0, "<=", 14.0),
                ConstraintInput::new(3.0, -1.0, ">=", 0.0),
                ConstraintInput::new(1.0, -1.0, "<=", 2.0),
            ]
        );

        let transcript = String::from_utf8(prompter.output).unwrap();
        assert!(transcript.contains("Constraint 3: a₁x + b₁y ≤/≥ c₁"));
    }

    #[test]
    fn test_count_is_reprompted() {
        let script = "7\n1\nabc\n2\n1\n0\n<=\n4\n0\n1\n<=\n3\n";
        let mut prompter = session(script);
        let inputs = prompter.constraints().unwrap();
        assert_eq!(inputs.len(), 2);

        let transcript = String::from_utf8(prompter.output).unwrap();
        assert_eq!(transcript.matches("Please enter a valid number of constraints").count(), 3);
    }

    #[test]
    fn test_bad_number_is_reprompted() {
        let mut prompter = session("min\nthree\n3\n-2.5\n");
        let objective = prompter.objective().unwrap();
        assert_eq!(objective, ObjectiveSpec::minimize(3.0, -2.5));

        let transcript = String::from_utf8(prompter.output).unwrap();
        assert!(transcript.contains("Please enter a number."));
    }

    #[test]
    fn test_anything_but_max_minimises() {
        let mut prompter = session("maybe\n1\n1\n");
        assert_eq!(prompter.objective().unwrap().sense, Sense::Minimize);
    }

    #[test]
    fn test_sign_is_not_validated_here() {
        let mut prompter = session("2\n1\n1\n<\n4\n1\n0\n>=\n1\n");
        let inputs = prompter.constraints().unwrap();
        assert_eq!(inputs[0].relation, "<");
    }

    #[test]
    fn test_end_of_input_is_an_error() {
        let mut prompter = session("max\n");
        assert!(prompter.objective().is_err());
    }
}
