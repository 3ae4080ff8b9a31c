use std::io::{stdout, BufWriter, Read, Write};

use anyhow::{Context, Result};
use rtcm3::framing::FrameReader;
use rtcm3::{DecodedMessage, MessageDecoder};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Serialize)]
struct Line<'a> {
    offset: usize,
    type_code: u16,
    message: &'a DecodedMessage,
}

pub fn decode<R>(reader: R, types: &[u16], threads: usize) -> Result<()>
where
    R: Read + Send + 'static,
{
    let out = BufWriter::new(stdout().lock());
    let count = decode_to(reader, types, threads, out)?;
    info!("decoded {count} messages");
    Ok(())
}

fn decode_to<R, W>(reader: R, types: &[u16], threads: usize, mut out: W) -> Result<usize>
where
    R: Read + Send + 'static,
    W: Write,
{
    let types = types.to_vec();
    let frames = FrameReader::new(reader)
        .filter_map(|zult| match zult {
            Ok(frame) => Some(frame),
            Err(err) => {
                warn!("read failed: {err}");
                None
            }
        })
        .filter(move |frame| types.is_empty() || types.contains(&frame.type_code));

    let decoded = MessageDecoder::builder()
        .num_threads(threads)
        .build()
        .decode(frames)
        .context("starting decoder")?;

    let mut count = 0;
    for frame in decoded {
        let message = match frame.message {
            Ok(message) => message,
            Err(err) => {
                warn!(offset = frame.offset, type_code = frame.type_code, "{err}");
                continue;
            }
        };
        if message.is_unknown() {
            debug!(offset = frame.offset, type_code = frame.type_code, "no decoder");
        }
        let line = Line {
            offset: frame.offset,
            type_code: frame.type_code,
            message: &message,
        };
        serde_json::to_writer(&mut out, &line).context("serializing message")?;
        writeln!(out).context("writing output")?;
        count += 1;
    }
    out.flush().context("flushing output")?;

    Ok(count)
}
