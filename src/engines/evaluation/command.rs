use super::metric::{EvaluationError, FitnessMetric};
use crate::engines::generation::Chromosome;
use crate::types::Cost;
use std::process::Command;

pub const CHROMOSOME_PLACEHOLDER: &str = "{chromosome}";

/// Measures a chromosome by running an external command.
///
/// Every `{chromosome}` in the arguments is replaced with the encoded
/// chromosome; without a placeholder the encoding is appended as the last
/// argument. The command must exit successfully and print the cost as an
/// unsigned integer.
#[derive(Debug, Clone)]
pub struct CommandMetric {
    program: String,
    args: Vec<String>,
}

impl CommandMetric {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    fn arguments(&self, encoded: &str) -> Vec<String> {
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(CHROMOSOME_PLACEHOLDER, encoded))
            .collect();
        if !self.args.iter().any(|arg| arg.contains(CHROMOSOME_PLACEHOLDER)) {
            args.push(encoded.to_string());
        }
        args
    }
}

impl FitnessMetric for CommandMetric {
    fn evaluate(&self, chromosome: &Chromosome) -> Result<Cost, EvaluationError> {
        let encoded = chromosome.encode();
        let output = Command::new(&self.program)
            .args(self.arguments(&encoded))
            .output()
            .map_err(|e| EvaluationError::Crashed(format!("failed to run {}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EvaluationError::Rejected(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout
            .trim()
            .parse::<u64>()
            .map(Cost)
            .map_err(|e| EvaluationError::Failed(format!("unparsable cost {:?}: {}", stdout.trim(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_placeholder_substitution() {
        let metric = CommandMetric::new("measure", vec!["--steps={chromosome}".to_string(), "-q".to_string()]);
        assert_eq!(metric.arguments("abc"), vec!["--steps=abc", "-q"]);
    }

    #[test]
    fn test_encoding_appended_without_placeholder() {
        let metric = CommandMetric::new("measure", vec!["-q".to_string()]);
        assert_eq!(metric.arguments("ca"), vec!["-q", "ca"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_cost_read_from_stdout() {
        let catalog = Catalog::from_abbreviations(&[("A", 'a'), ("B", 'b')]).unwrap();
        let metric = CommandMetric::new(
            "sh",
            vec!["-c".to_string(), "printf '%s' \"$1\" | wc -c".to_string(), "sh".to_string()],
        );
        let chromosome = Chromosome::decode(&catalog, "abab").unwrap();
        assert_eq!(metric.evaluate(&chromosome), Ok(Cost(4)));
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_rejection() {
        let metric = CommandMetric::new("sh", vec!["-c".to_string(), "exit 3".to_string(), "sh".to_string()]);
        assert!(matches!(
            metric.evaluate(&Chromosome::empty()),
            Err(EvaluationError::Rejected(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_garbage_output_is_failure() {
        let metric = CommandMetric::new("sh", vec!["-c".to_string(), "echo nope".to_string(), "sh".to_string()]);
        assert!(matches!(
            metric.evaluate(&Chromosome::empty()),
            Err(EvaluationError::Failed(_))
        ));
    }

    #[test]
    fn test_missing_program_is_crash() {
        let metric = CommandMetric::new("/nonexistent/passphaser-metric", Vec::new());
        assert!(matches!(
            metric.evaluate(&Chromosome::empty()),
            Err(EvaluationError::Crashed(_))
        ));
    }
}
