//! Confirmation prompt

use crate::error::{DebuginfoError, DebuginfoResult};
use std::io::{self, BufRead, Write};
use tracing::info;

/// Extra attempts allowed after an unrecognised answer
pub const PROMPT_RETRIES: u32 = 4;

/// Where confirmation answers are read from, normally stdin
pub type Answers = Box<dyn BufRead + Send>;

/// Ask a yes/no question without blocking the runtime
///
/// The read happens on the blocking pool so signal handling and other
/// tasks keep running while the user thinks. The reader is consumed: a
/// read still pending when the process exits is simply abandoned.
pub async fn confirm(mut input: Answers, prompt: &'static str, retries: u32) -> DebuginfoResult<bool> {
    tokio::task::spawn_blocking(move || ask_yes_no(&mut *input, prompt, retries))
        .await
        .map_err(|e| DebuginfoError::Internal(format!("prompt task failed: {}", e)))
}

/// Ask a yes/no question on `input`
///
/// `y`/`Y` accepts; `n`/`N` or an empty line declines. Anything else asks
/// again, up to `retries` more times, then declines. End of input accepts:
/// it means stdin is closed, as when spawned by a helper that cannot answer.
pub fn ask_yes_no(input: &mut dyn BufRead, prompt: &str, retries: u32) -> bool {
    let mut remaining = retries;
    loop {
        print!("{}", prompt);
        let _ = io::stdout().flush();

        let mut line = String::new();
        let answer = match input.read_line(&mut line) {
            Ok(0) => {
                info!("got eof, probably executed from helper, assuming - yes");
                println!();
                "y"
            }
            Ok(_) => line.trim_end_matches(['\r', '\n']),
            Err(_) => return false,
        };

        match answer {
            "y" | "Y" => return true,
            "n" | "N" | "" => return false,
            _ => {}
        }

        if remaining == 0 {
            return false;
        }
        remaining -= 1;
    }
}
