//! Non-interactive use: one prompt in, streamed text and a final preview out.

use crate::api::ApiClient;
use crate::config::Config;
use crate::preview::{EsbuildCompiler, RenderPipeline};
use crate::state::StreamCoordinator;
use crate::types::GenerationRequest;
use crate::ui::preview::{plain_text, preview_lines};
use anyhow::{anyhow, Result};
use std::io::Write;
use std::time::Instant;

pub async fn run_headless<W: Write>(config: &Config, prompt: &str, out: &mut W) -> Result<()> {
    let coordinator = StreamCoordinator::new(ApiClient::new(config)?);
    let mut pipeline = RenderPipeline::new(
        config.profile.content_kind(),
        Box::new(EsbuildCompiler::new(config.compiler.clone())),
        config.render_debounce,
    );
    let request = GenerationRequest::new(prompt, config.profile);
    stream_to_writer(&coordinator, &request, &mut pipeline, out).await?;
    Ok(())
}

/// Streams `request` to `out` as it arrives, then renders the preview once
/// and prints it. Returns the full response text.
pub async fn stream_to_writer<W: Write>(
    coordinator: &StreamCoordinator,
    request: &GenerationRequest,
    pipeline: &mut RenderPipeline,
    out: &mut W,
) -> Result<String> {
    let mut text = String::new();
    let mut write_error = None;

    let result = coordinator
        .stream(request, |increment| {
            text.push_str(increment);
            if write_error.is_none() {
                if let Err(e) = out.write_all(increment.as_bytes()).and_then(|_| out.flush()) {
                    write_error = Some(e);
                }
            }
        })
        .await;

    if let Some(e) = write_error {
        return Err(e.into());
    }
    result.map_err(|e| anyhow!("Generation Failed: {e}"))?;

    pipeline.on_text_changed(&text, Instant::now());
    pipeline.flush();

    writeln!(out)?;
    writeln!(out)?;
    writeln!(out, "--- preview ({}) ---", pipeline.kind())?;
    for line in plain_text(&preview_lines(pipeline)) {
        writeln!(out, "{}", line.trim_end())?;
    }
    out.flush()?;
    Ok(text)
}
