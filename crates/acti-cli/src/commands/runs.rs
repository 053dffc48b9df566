//! Runs command: boundaries of contiguous runs in a 0/1 flag list.

use std::io::Write;

use acti_core::runs::extract_runs_checked;
use anyhow::{Context, Result};

pub fn run<W: Write>(writer: &mut W, flags: &str, len: Option<usize>) -> Result<()> {
    let flags = parse_flags(flags)?;
    let boundaries = extract_runs_checked(&flags, len.unwrap_or(flags.len()))?;

    if boundaries.is_empty() {
        writeln!(writer, "no runs")?;
        return Ok(());
    }
    let joined: Vec<String> = boundaries.iter().map(ToString::to_string).collect();
    writeln!(writer, "{}", joined.join(","))?;
    Ok(())
}

fn parse_flags(flags: &str) -> Result<Vec<u8>> {
    flags
        .split(',')
        .map(str::trim)
        .filter(|flag| !flag.is_empty())
        .map(|flag| {
            flag.parse::<u8>()
                .with_context(|| format!("invalid flag {flag:?}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(flags: &str, len: Option<usize>) -> Result<String> {
        let mut output = Vec::new();
        run(&mut output, flags, len)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn prints_boundaries() {
        assert_eq!(runs("0,0,0,1,1,0", None).unwrap(), "3,5\n");
        assert_eq!(runs("1, 0, 0, 1, 1, 1", None).unwrap(), "0,1,3,5\n");
        assert_eq!(runs("0,0", None).unwrap(), "no runs\n");
    }

    #[test]
    fn rejects_bad_input() {
        let err = runs("0,1,2", None).unwrap_err();
        assert_eq!(err.to_string(), "flag at index 2 is 2, expected 0 or 1");

        let err = runs("0,1", Some(3)).unwrap_err();
        assert_eq!(err.to_string(), "flag vector has 2 points, expected 3");

        assert!(runs("0,x", None).is_err());
    }
}
