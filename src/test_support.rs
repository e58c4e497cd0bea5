use tokio::sync::Mutex as AsyncMutex;

/// Process-wide lock for tests that mutate environment variables.
/// Use `.blocking_lock()` in sync tests and `.lock().await` in async tests.
pub static ENV_LOCK: AsyncMutex<()> = AsyncMutex::const_new(());

/// One SSE frame carrying a text part, shaped like a streamed Gemini chunk.
pub fn text_frame(text: &str) -> String {
    let payload = serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] }
        }]
    });
    format!("data: {payload}\r\n\r\n")
}

/// Closing SSE frame with a finish reason and no text.
pub fn finish_frame() -> String {
    let payload = serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": [] },
            "finishReason": "STOP"
        }]
    });
    format!("data: {payload}\r\n\r\n")
}

/// SSE frame reporting a service error in the middle of a stream.
pub fn error_frame(message: &str) -> String {
    let payload = serde_json::json!({
        "error": { "code": 500, "message": message, "status": "INTERNAL" }
    });
    format!("data: {payload}\r\n\r\n")
}

/// Splits `text` into `parts` roughly equal increments on char boundaries.
pub fn split_increments(text: &str, parts: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let size = chars.len().div_ceil(parts.max(1)).max(1);
    chars
        .chunks(size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
