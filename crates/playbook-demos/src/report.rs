// ABOUTME: Top-level failure note: the error's category name plus a static explanation.
// ABOUTME: Used by the binary's single catch-all handler; no error is retried or recovered.

use std::io::Write;

use playbook_agent::SwarmError;
use playbook_core::InvokeError;

/// Find the invocation error behind a demo failure, if there is one.
fn invoke_error(err: &anyhow::Error) -> Option<&InvokeError> {
    err.chain().find_map(|cause| {
        cause.downcast_ref::<InvokeError>().or_else(|| {
            match cause.downcast_ref::<SwarmError>() {
                Some(SwarmError::Invoke(inner)) => Some(inner),
                _ => None,
            }
        })
    })
}

/// Category name printed for a failure.
pub fn failure_category(err: &anyhow::Error) -> &'static str {
    match invoke_error(err) {
        Some(invoke) => invoke.category(),
        None if err.downcast_ref::<SwarmError>().is_some() => "SwarmError",
        None if err.downcast_ref::<std::io::Error>().is_some() => "IoError",
        None => "Error",
    }
}

/// Print the failure note for a demo run.
pub fn write_failure_note<W: Write>(
    out: &mut W,
    err: &anyhow::Error,
    about: &str,
) -> std::io::Result<()> {
    let explanation = invoke_error(err)
        .map(InvokeError::explanation)
        .unwrap_or("The demo stopped before it could finish.");

    writeln!(out)?;
    writeln!(out, "Note: {}", explanation)?;
    writeln!(out, "Error: {}", failure_category(err))?;
    writeln!(out)?;
    writeln!(out, "{}", about)?;
    Ok(())
}
