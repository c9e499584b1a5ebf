//! Simple sandbox example - screen and run a few snippets
//!
//! Uses `/bin/sh -s` as the interpreter so it runs without Python.

use runbox_sandbox::{ExecutionRequest, InterpreterConfig, SandboxConfig, SandboxService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = SandboxConfig {
        interpreter: InterpreterConfig::new("/bin/sh", ["-s"]),
        ..SandboxConfig::default()
    };
    let service = SandboxService::from_config(&config)?;

    println!("=== Sandbox Service Example ===\n");
    println!("Runtime: {}\n", service.runtime_name());

    println!("Example 1: Simple echo");
    execute_and_print(&service, ExecutionRequest::new("echo 'Hello from sandbox!'")).await?;

    println!("\nExample 2: Rejected by screening");
    execute_and_print(&service, ExecutionRequest::new("import os")).await?;

    println!("\nExample 3: Long running task with timeout");
    execute_and_print(
        &service,
        ExecutionRequest::new("sleep 10 && echo 'Done!'").with_timeout_ms(500.0),
    )
    .await?;

    println!("\nExample 4: Error to stderr");
    execute_and_print(&service, ExecutionRequest::new("echo 'Error message' >&2; exit 1")).await?;

    Ok(())
}

async fn execute_and_print(
    service: &SandboxService,
    request: ExecutionRequest,
) -> anyhow::Result<()> {
    let outcome = service.handle(request).await?;
    println!("  {}", outcome);
    Ok(())
}
