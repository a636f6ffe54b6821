//! Subprocess adapter for the external analyses.
//!
//! Each call spawns the configured program, writes one JSON request to its
//! stdin and reads one JSON response from its stdout:
//!
//! ```text
//! -> {"op":"fuzz","network":"...","deletions":1,"swaps":0}
//! <- {"result":"..."}
//! <- {"error":"invalid-mutation","message":"no swappable actions"}
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use super::{Analyses, ChoreographyStatistics, Extraction, NetworkStatistics, ProgramStatistics};
use crate::core::{Strategy, Verdict};
use crate::errors::AnalysisError;

/// Error code the analyzer uses for a mutation that does not fit the network.
pub const INVALID_MUTATION: &str = "invalid-mutation";

/// How to launch the analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to run.
    pub program: PathBuf,
    /// Arguments passed before the request is written.
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandConfig {
    /// Creates a config running `program` without arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Adds an argument.
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    Project {
        choreography: &'a str,
    },
    Extract {
        network: &'a str,
        strategy: Strategy,
    },
    Bisimilar {
        original: &'a str,
        extracted: &'a str,
    },
    Fuzz {
        network: &'a str,
        deletions: u32,
        swaps: u32,
    },
    Unfold {
        network: &'a str,
        probability: f64,
        iterations: u32,
    },
    Shift {
        network: &'a str,
        probability: f64,
    },
    ChoreographyStatistics {
        choreography: &'a str,
    },
    NetworkStatistics {
        network: &'a str,
    },
    ProgramStatistics {
        choreography: &'a str,
    },
}

impl Request<'_> {
    fn op(&self) -> &'static str {
        match self {
            Self::Project { .. } => "project",
            Self::Extract { .. } => "extract",
            Self::Bisimilar { .. } => "bisimilar",
            Self::Fuzz { .. } => "fuzz",
            Self::Unfold { .. } => "unfold",
            Self::Shift { .. } => "shift",
            Self::ChoreographyStatistics { .. } => "choreography_statistics",
            Self::NetworkStatistics { .. } => "network_statistics",
            Self::ProgramStatistics { .. } => "program_statistics",
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Response<T> {
    Success {
        result: T,
    },
    Failure {
        error: String,
        #[serde(default)]
        message: String,
    },
}

/// Decodes an analyzer response.
fn decode<T: DeserializeOwned>(op: &str, stdout: &[u8]) -> Result<T, AnalysisError> {
    let response: Response<T> = serde_json::from_slice(stdout)
        .map_err(|e| AnalysisError::Protocol(format!("{op}: undecodable response: {e}")))?;
    match response {
        Response::Success { result } => Ok(result),
        Response::Failure { error, message } if error == INVALID_MUTATION => {
            Err(AnalysisError::InvalidMutation(message))
        }
        Response::Failure { error, message } => Err(AnalysisError::failed(
            op,
            if message.is_empty() { error } else { format!("{error}: {message}") },
        )),
    }
}

/// Runs every analysis through an external program.
#[derive(Debug, Clone)]
pub struct CommandAnalyses {
    config: CommandConfig,
}

impl CommandAnalyses {
    /// Creates an adapter for `config`.
    #[must_use]
    pub fn new(config: CommandConfig) -> Self {
        Self { config }
    }

    /// Returns the launch configuration.
    #[must_use]
    pub fn config(&self) -> &CommandConfig {
        &self.config
    }

    fn call<T: DeserializeOwned>(&self, request: &Request<'_>) -> Result<T, AnalysisError> {
        let op = request.op();
        let payload = serde_json::to_vec(request)
            .map_err(|e| AnalysisError::Protocol(format!("{op}: failed to encode request: {e}")))?;

        let mut child = Command::new(&self.config.program)
            .args(&self.config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // The analyzer may answer before it has read the whole request, so the
        // request is fed from its own thread while both output pipes drain.
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| thread::spawn(move || stdin.write_all(&payload)));

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("request writer panicked"))),
            None => Ok(()),
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(AnalysisError::failed(
                op,
                format!("exited with {}: {stderr}", output.status),
            ));
        }
        if let Err(e) = written {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e.into());
            }
        }

        decode(op, &output.stdout)
    }
}

impl Analyses for CommandAnalyses {
    fn project(&self, choreography: &str) -> Result<String, AnalysisError> {
        self.call(&Request::Project { choreography })
    }

    fn extract(&self, network: &str, strategy: Strategy) -> Result<Extraction, AnalysisError> {
        self.call(&Request::Extract { network, strategy })
    }

    fn bisimilar(&self, original: &str, extracted: &str) -> Result<Verdict, AnalysisError> {
        self.call(&Request::Bisimilar { original, extracted })
    }

    fn fuzz(&self, network: &str, deletions: u32, swaps: u32) -> Result<String, AnalysisError> {
        self.call(&Request::Fuzz {
            network,
            deletions,
            swaps,
        })
    }

    fn unfold(
        &self,
        network: &str,
        probability: f64,
        iterations: u32,
    ) -> Result<String, AnalysisError> {
        self.call(&Request::Unfold {
            network,
            probability,
            iterations,
        })
    }

    fn shift(&self, network: &str, probability: f64) -> Result<String, AnalysisError> {
        self.call(&Request::Shift { network, probability })
    }

    fn choreography_statistics(
        &self,
        choreography: &str,
    ) -> Result<ChoreographyStatistics, AnalysisError> {
        self.call(&Request::ChoreographyStatistics { choreography })
    }

    fn network_statistics(&self, network: &str) -> Result<NetworkStatistics, AnalysisError> {
        self.call(&Request::NetworkStatistics { network })
    }

    fn program_statistics(&self, choreography: &str) -> Result<ProgramStatistics, AnalysisError> {
        self.call(&Request::ProgramStatistics { choreography })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyses::ExtractionOutcome;

    #[test]
    fn test_request_encoding() {
        let request = Request::Fuzz {
            network: "a { main { stop } }",
            deletions: 1,
            swaps: 0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["op"], "fuzz");
        assert_eq!(json["deletions"], 1);
        assert_eq!(request.op(), "fuzz");

        let json = serde_json::to_value(Request::Extract {
            network: "n",
            strategy: Strategy::UnmarkedThenRandom,
        })
        .unwrap();
        assert_eq!(json["strategy"], "UnmarkedThenRandom");
    }

    #[test]
    fn test_decode_success() {
        let verdict: Verdict = decode("bisimilar", br#"{"result":"MAYBE"}"#).unwrap();
        assert_eq!(verdict, Verdict::Maybe);

        let extraction: Extraction = decode(
            "extract",
            br#"{"result":{"outcome":{"kind":"unextractable"},"graph":{"nodes":12,"badLoops":2}}}"#,
        )
        .unwrap();
        assert_eq!(extraction.outcome, ExtractionOutcome::Unextractable);
        assert_eq!(extraction.graph.bad_loops, 2);
    }

    #[test]
    fn test_decode_invalid_mutation_is_recoverable() {
        let err = decode::<String>("fuzz", br#"{"error":"invalid-mutation","message":"no swaps"}"#)
            .unwrap_err();
        assert!(err.is_recoverable());
        assert!(matches!(err, AnalysisError::InvalidMutation(ref m) if m == "no swaps"));
    }

    #[test]
    fn test_decode_other_error() {
        let err = decode::<String>("project", br#"{"error":"parse-error","message":"line 1"}"#)
            .unwrap_err();
        assert!(!err.is_recoverable());
        assert_eq!(err.to_string(), "project failed: parse-error: line 1");
    }

    #[test]
    fn test_decode_garbage() {
        let err = decode::<String>("project", b"Exception in thread main").unwrap_err();
        assert!(matches!(err, AnalysisError::Protocol(_)));
    }

    #[test]
    fn test_missing_program() {
        let analyses = CommandAnalyses::new(CommandConfig::new("/nonexistent/chorbench-analyzer"));
        assert!(matches!(analyses.project("main { stop }"), Err(AnalysisError::Io(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_round_trip_through_shell() {
        let config = CommandConfig::new("sh")
            .with_arg("-c")
            .with_arg(r#"cat > /dev/null; printf '{"result":"p { main { stop } }"}'"#);
        let analyses = CommandAnalyses::new(config);
        assert_eq!(analyses.project("main { stop }").unwrap(), "p { main { stop } }");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit() {
        let config = CommandConfig::new("sh")
            .with_arg("-c")
            .with_arg("cat > /dev/null; echo boom >&2; exit 3");
        let analyses = CommandAnalyses::new(config);
        let err = analyses.network_statistics("n").unwrap_err();
        assert!(matches!(err, AnalysisError::Failed { .. }));
        assert!(err.to_string().contains("boom"));
    }
}
