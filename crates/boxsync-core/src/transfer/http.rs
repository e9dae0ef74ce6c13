//! libcurl-backed transport.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use curl::easy::Easy;

use super::{Transfer, TransferProgress};
use crate::error::TransferError;

/// Transport over libcurl `Easy` handles, one handle per request.
///
/// Only connection establishment is bounded; a transfer that stalls after
/// connecting keeps its caller waiting.
#[derive(Debug, Clone)]
pub struct CurlTransfer {
    connect_timeout: Duration,
    max_redirections: u32,
}

impl Default for CurlTransfer {
    fn default() -> Self {
        Self::new()
    }
}

impl CurlTransfer {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            max_redirections: 10,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    fn handle(&self, url: &str) -> Result<Easy, TransferError> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.max_redirections)?;
        easy.connect_timeout(self.connect_timeout)?;
        Ok(easy)
    }
}

/// Map a completed request's status to an error for 4xx/5xx.
fn check_status(easy: &mut Easy) -> Result<(), TransferError> {
    let code = easy.response_code()?;
    if code >= 400 {
        return Err(TransferError::Http(code));
    }
    Ok(())
}

impl Transfer for CurlTransfer {
    fn get(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let mut body = Vec::new();
        let mut easy = self.handle(url)?;
        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }
        check_status(&mut easy)?;
        Ok(body)
    }

    fn fetch(
        &self,
        url: &str,
        dest: &Path,
        on_progress: &mut dyn FnMut(TransferProgress),
    ) -> Result<u64, TransferError> {
        let mut file = File::create(dest)?;
        let mut written = 0u64;
        let mut write_err: Option<io::Error> = None;

        let mut easy = self.handle(url)?;
        easy.fail_on_error(true)?;
        easy.progress(true)?;
        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            transfer.progress_function(|dltotal, dlnow, _, _| {
                on_progress(TransferProgress {
                    bytes_done: dlnow.max(0.0) as u64,
                    total_bytes: dltotal.max(0.0) as u64,
                });
                true
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(TransferError::Io(e));
        }
        if let Err(e) = performed {
            if e.is_http_returned_error() {
                check_status(&mut easy)?;
            }
            return Err(TransferError::Curl(e));
        }
        check_status(&mut easy)?;
        file.flush()?;
        Ok(written)
    }
}
