mod cli;
mod error;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;

use attrix_core::{BatchProcessor, BatchResponse, ReqwestHttpClient};

use crate::cli::Cli;
use crate::error::CliError;

const API_TOKEN_ENV: &str = "ATTRIX_ADJUST_API_TOKEN";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("error: {error}");
        std::process::exit(error.exit_code());
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    let body = read_request(cli.input.as_deref())?;

    // The credential is resolved here and handed to core explicitly; core
    // never reads the environment.
    let api_token = std::env::var(API_TOKEN_ENV).ok();

    let mut processor = BatchProcessor::new(Arc::new(ReqwestHttpClient::new()), api_token);
    if let Some(base_url) = cli.base_url {
        processor = processor.with_base_url(base_url);
    }

    let response = processor.process_request(&body).await;
    println!("{}", render(&response, cli.pretty)?);
    Ok(())
}

fn read_request(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            Ok(body)
        }
    }
}

fn render(response: &BatchResponse, pretty: bool) -> Result<String, CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)?
    } else {
        serde_json::to_string(response)?
    };
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn read_request_reads_the_given_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("request.json");
        let mut file = std::fs::File::create(&path).expect("create file");
        write!(file, r#"{{"data": []}}"#).expect("write request");

        let body = read_request(Some(path.as_path())).expect("read request");
        assert_eq!(body, r#"{"data": []}"#);
    }

    #[test]
    fn read_request_fails_on_missing_file() {
        let error = read_request(Some(Path::new("/nonexistent/request.json")))
            .expect_err("missing file must fail");
        assert!(matches!(error, CliError::Io(_)));
    }

    #[test]
    fn render_compact_and_pretty_agree_on_content() {
        let response = BatchResponse::top_level_error("batch error: boom");

        let compact = render(&response, false).expect("compact renders");
        let pretty = render(&response, true).expect("pretty renders");

        let compact_value: serde_json::Value =
            serde_json::from_str(&compact).expect("compact is JSON");
        let pretty_value: serde_json::Value =
            serde_json::from_str(&pretty).expect("pretty is JSON");
        assert_eq!(compact_value, pretty_value);
        assert!(pretty.contains('\n'));
        assert!(!compact.contains('\n'));
    }
}
