use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Output, Stdio};

/// Run the CLI binary with arguments.
pub fn run_cli(args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_contacts"));
    cmd.args(args);
    cmd.env_remove("ABOOK_URL").env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI against a service and expect success.
pub fn run_book_success(url: &str, args: &[&str]) -> String {
    let output = run_book(url, args);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Run a `book` subcommand against a service.
pub fn run_book(url: &str, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_contacts"));
    cmd.arg("book").args(args);
    cmd.env("ABOOK_URL", url).env("NO_COLOR", "1");
    cmd.output().expect("Failed to execute CLI")
}

/// A `contacts serve` process bound to an ephemeral port, killed on drop.
pub struct TestServer {
    child: Child,
    pub url: String,
}

impl TestServer {
    pub fn start(extra: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_contacts"))
            .args(["serve", "--listen", "127.0.0.1:0"])
            .args(extra)
            .env_remove("ABOOK_DEMO_DATA")
            .env_remove("ABOOK_SAFE_MODE")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .expect("Failed to start server");

        let stdout = child.stdout.take().expect("no stdout");
        let mut line = String::new();
        BufReader::new(stdout)
            .read_line(&mut line)
            .expect("Failed to read server banner");

        let url = line
            .trim()
            .strip_prefix("Listening on ")
            .unwrap_or_else(|| panic!("unexpected banner: {line:?}"))
            .to_string();

        Self { child, url }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
