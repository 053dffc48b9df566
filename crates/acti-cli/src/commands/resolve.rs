//! Resolve command: place a dragged sleep window among its neighbours.

use std::io::Write;

use acti_core::{Interval, resolve_conflict};
use anyhow::{Context, Result};

pub fn run<W: Write>(writer: &mut W, dragged: Interval, others: &[Interval]) -> Result<()> {
    let resolved = resolve_conflict(dragged, others)
        .with_context(|| format!("cannot place {dragged}"))?;
    writeln!(writer, "{resolved}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iv(start: i64, end: i64) -> Interval {
        Interval::new(start, end).unwrap()
    }

    fn resolve(dragged: Interval, others: &[Interval]) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, dragged, others)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn prints_resolved_window() {
        assert_eq!(resolve(iv(10, 20), &[iv(0, 9)]).unwrap(), "[10, 20]\n");
        assert_eq!(resolve(iv(5, 15), &[iv(0, 9)]).unwrap(), "[10, 15]\n");
    }

    #[test]
    fn divergence_is_an_error() {
        let err = resolve(iv(5, 15), &[iv(0, 10), iv(11, 20)]).unwrap_err();
        assert_eq!(err.to_string(), "cannot place [5, 15]");
        assert_eq!(
            err.root_cause().to_string(),
            "sleep window placement did not converge after 10 iterations"
        );
    }
}
