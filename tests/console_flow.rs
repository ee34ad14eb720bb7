//! Operator console driving a session end to end.

mod common;

use std::time::Duration;

use common::{MockServer, TestBot, config_for, wait_for};
use supportbot::config::Config;
use supportbot::console::Console;
use supportbot::state::{Session, SessionState};
use supportbot_proto::Command;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

#[tokio::test]
async fn operator_session_end_to_end() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::spawn(Config::default());
    let session = bot.session.clone();

    let (mut operator, input) = tokio::io::duplex(4096);
    let mut console = Console::new(
        BufReader::new(input),
        Vec::new(),
        bot.session.clone(),
        Duration::from_secs(2),
    );

    let (ran, scripted) = tokio::join!(console.run(), async {
        let setup = format!(
            "start\nnick Bot\nserver {}\njoin #test\nchannels\nstart\nstart\n",
            server.address()
        );
        operator.write_all(setup.as_bytes()).await?;

        let mut conn = server.accept().await?;
        conn.expect_registration("Bot").await?;
        conn.welcome("Bot").await?;
        conn.accept_join("Bot", "#test").await?;
        anyhow::ensure!(wait_for(|| session.lock().is_joined("#test")).await);

        operator
            .write_all(b"speak #other\nspeak #test\nhello there\nexit\n")
            .await?;
        anyhow::ensure!(conn.expect_privmsg("#test").await? == "hello there");
        let quit = conn.recv().await?;
        anyhow::ensure!(quit.command == Command::QUIT(Some("Shutting down.".to_string())));
        conn.expect_closed().await
    });
    ran?;
    scripted?;

    let out = String::from_utf8(console.output().clone())?;
    assert!(out.starts_with("Enter commands as desired. Enter help for command information.\n"));
    assert!(out.contains("> Info not set.\n"));
    assert!(out.contains("Channels: #test\n"));
    assert!(out.contains("Already connected.\n"));
    assert!(out.contains("Not in channel.\n"));
    assert!(out.contains("Message: "));
    assert_eq!(bot.session.lock().state(), SessionState::Disconnected);
    Ok(())
}

#[tokio::test]
async fn set_lines_reads_from_configured_directory() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("Greet.txt"), "hi\n\nhello\n")?;

    let mut config = config_for("Bot", "127.0.0.1:1");
    config.bot.lines_dir = dir.path().to_path_buf();
    let (tx, _rx) = mpsc::channel(16);
    let session = Session::new(&config, tx).into_shared();

    let mut console = Console::new(
        &b"set-lines Greet\nset-lines missing\nexit\n"[..],
        Vec::new(),
        session.clone(),
        Duration::from_millis(100),
    );
    console.run().await?;

    let out = String::from_utf8(console.output().clone())?;
    assert!(out.contains("missing.txt"));
    assert!(session.lock().responses().contains("greet"));
    Ok(())
}
