use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::RunError;
use crate::util::RingBytes;

/// Splits stdout into lines (lossy UTF-8, `\n` or `\r\n`) and forwards them in order.
/// Lines longer than `max_line_bytes` are forwarded in pieces of that size.
/// Stops early once the receiver is gone.
pub fn pump_stdout_lines<R>(
    mut rd: R,
    line_tx: mpsc::Sender<String>,
    max_line_bytes: usize,
) -> JoinHandle<Result<u64, RunError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    let max_line_bytes = max_line_bytes.max(1);
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        let mut line_buf: Vec<u8> = Vec::with_capacity(8 * 1024);
        // Bytes of `line_buf` already known to hold no newline.
        let mut scanned = 0usize;

        loop {
            let n = rd.read(&mut buf).await.map_err(|e| RunError::StreamIo {
                stream: "stdout",
                source: e,
            })?;
            if n == 0 {
                break;
            }
            total += n as u64;

            line_buf.extend_from_slice(&buf[..n]);
            loop {
                let newline = line_buf[scanned..]
                    .iter()
                    .position(|&b| b == b'\n')
                    .map(|off| scanned + off);
                let piece = match newline {
                    Some(pos) if pos <= max_line_bytes => {
                        let mut one = line_buf.drain(..=pos).collect::<Vec<u8>>();
                        trim_newline(&mut one);
                        scanned = 0;
                        one
                    }
                    _ if line_buf.len() > max_line_bytes => {
                        let chunk = line_buf.drain(..max_line_bytes).collect::<Vec<u8>>();
                        scanned = newline.map_or(line_buf.len(), |pos| pos - max_line_bytes);
                        chunk
                    }
                    _ => {
                        scanned = line_buf.len();
                        break;
                    }
                };
                if !forward(&line_tx, &piece).await {
                    return Ok(total);
                }
            }
        }

        // EOF flush: deliver the last partial line if it doesn't end with '\n'.
        if !line_buf.is_empty() {
            trim_newline(&mut line_buf);
            if !line_buf.is_empty() {
                let _ = forward(&line_tx, &line_buf).await;
            }
        }

        Ok(total)
    })
}

async fn forward(line_tx: &mpsc::Sender<String>, bytes: &[u8]) -> bool {
    line_tx
        .send(String::from_utf8_lossy(bytes).into_owned())
        .await
        .is_ok()
}

/// Drains stderr into `ring` until EOF. Runs alongside stdout so a chatty stderr
/// cannot fill its pipe and stall the child.
pub fn pump_stderr_tail<R>(mut rd: R, ring: Arc<RingBytes>) -> JoinHandle<Result<u64, RunError>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = vec![0u8; 16 * 1024];
        let mut total = 0u64;
        loop {
            let n = rd.read(&mut buf).await.map_err(|e| RunError::StreamIo {
                stream: "stderr",
                source: e,
            })?;
            if n == 0 {
                break;
            }
            ring.push(&buf[..n]);
            total += n as u64;
        }
        Ok(total)
    })
}

fn trim_newline(buf: &mut Vec<u8>) {
    if buf.last() == Some(&b'\n') {
        buf.pop();
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
}
