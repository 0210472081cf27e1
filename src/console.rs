use crate::agent::ChatAgent;
use crate::models::chat::MessageRecord;
use futures::Stream;
use futures::stream::{ FuturesUnordered, StreamExt };
use log::{ info, debug };
use std::error::Error;
use std::io::BufRead;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt };
use tokio::sync::mpsc;
use tokio_stream::wrappers::{ LinesStream, ReceiverStream };

const QUIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

/// Lines typed on the terminal. Reading happens on a plain thread so a
/// pending read never holds up runtime shutdown.
pub fn stdin_lines() -> ReceiverStream<std::io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    ReceiverStream::new(rx)
}

pub fn reader_lines<R: AsyncBufRead + Unpin>(reader: R) -> LinesStream<R> {
    LinesStream::new(reader.lines())
}

async fn render<W>(output: &mut W, record: &MessageRecord) -> std::io::Result<()>
    where W: AsyncWrite + Unpin
{
    output.write_all(format!("{}: {}\n", record.role, record.text).as_bytes()).await?;
    output.flush().await
}

/// Line-oriented front end. Input keeps being read while replies are
/// outstanding; replies are shown in the order they arrive. On end of input
/// the loop drains outstanding replies before returning.
pub async fn run_console<S, W>(
    agent: &ChatAgent,
    mut lines: S,
    mut output: W
) -> Result<(), Box<dyn Error + Send + Sync>>
    where S: Stream<Item = std::io::Result<String>> + Unpin, W: AsyncWrite + Unpin
{
    let mut pending = FuturesUnordered::new();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next(), if input_open => {
                match line {
                    Some(Ok(line)) => {
                        if QUIT_COMMANDS.contains(&line.trim()) {
                            info!("Quit requested, waiting for {} outstanding replies", pending.len());
                            input_open = false;
                            continue;
                        }
                        if let Some(submission) = agent.submit(&line).await {
                            render(&mut output, &submission.record).await?;
                            pending.push(submission.reply);
                        }
                    }
                    Some(Err(e)) => {
                        return Err(e.into());
                    }
                    None => {
                        debug!("Input closed");
                        input_open = false;
                    }
                }
            }
            Some(delivery) = pending.next(), if !pending.is_empty() => {
                let record = agent.deliver(delivery).await;
                render(&mut output, &record).await?;
            }
            else => break,
        }
    }

    Ok(())
}
