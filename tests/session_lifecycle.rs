//! Connect, reconfigure and disconnect against mock servers.

mod common;

use std::time::Duration;

use common::{MockServer, TestBot, wait_for};
use supportbot::error::SessionError;
use supportbot::state::SessionState;
use supportbot_proto::Command;

#[tokio::test]
async fn channels_are_joined_in_order_after_welcome() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &server.address());
    {
        let mut session = bot.session.lock();
        session.join("#b");
        session.join("#a");
        session.connect()?;
        // Not registered yet: joined on welcome, not now.
        session.join("#c");
    }

    let mut conn = server.accept().await?;
    conn.expect_registration("Bot").await?;
    conn.expect_silence(Duration::from_millis(100)).await?;
    conn.welcome("Bot").await?;
    conn.accept_join("Bot", "#b").await?;
    conn.accept_join("Bot", "#a").await?;
    conn.accept_join("Bot", "#c").await?;

    let session = bot.session.clone();
    assert!(wait_for(|| session.lock().is_joined("#c")).await);

    // Registered now: joins go out immediately.
    assert!(bot.session.lock().join("#d"));
    conn.accept_join("Bot", "#d").await?;
    // Already tracked: nothing is sent.
    assert!(!bot.session.lock().join("#d"));
    conn.expect_silence(Duration::from_millis(100)).await?;
    Ok(())
}

#[tokio::test]
async fn nick_change_is_sent_live() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &server.address());
    bot.session.lock().connect()?;
    let mut conn = server.accept_registered("Bot").await?;

    bot.session.lock().set_nick("Dicer");
    let msg = conn.recv().await?;
    assert_eq!(msg.command, Command::NICK("Dicer".to_string()));
    assert_eq!(bot.session.lock().state(), SessionState::Connected);
    Ok(())
}

#[tokio::test]
async fn server_change_quits_and_reconnects() -> anyhow::Result<()> {
    let first = MockServer::bind().await?;
    let second = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &first.address());
    bot.session.lock().join("#test");
    bot.session.lock().connect()?;

    let mut old = first.accept_registered("Bot").await?;
    old.accept_join("Bot", "#test").await?;

    bot.session.lock().set_server(&second.address())?;
    let quit = old.recv().await?;
    assert_eq!(quit.command, Command::QUIT(Some("Shutting down.".to_string())));
    old.expect_closed().await?;

    let mut new = second.accept_registered("Bot").await?;
    new.accept_join("Bot", "#test").await?;
    assert_eq!(bot.session.lock().server(), Some(second.address().as_str()));

    // The retired link's teardown must not end the session.
    new.send_raw("PING :still-alive").await?;
    assert_eq!(
        new.recv().await?.command,
        Command::PONG("still-alive".to_string(), None)
    );
    assert!(!bot.events.is_finished());
    Ok(())
}

#[tokio::test]
async fn disconnect_sends_quit_and_closes() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &server.address());
    bot.session.lock().connect()?;
    let mut conn = server.accept_registered("Bot").await?;

    let handle = bot.session.lock().disconnect().expect("was connected");
    tokio::time::timeout(Duration::from_secs(5), handle).await??;

    let quit = conn.recv().await?;
    assert_eq!(quit.command, Command::QUIT(Some("Shutting down.".to_string())));
    conn.expect_closed().await?;
    assert_eq!(bot.session.lock().state(), SessionState::Disconnected);
    assert!(bot.session.lock().disconnect().is_none());
    Ok(())
}

#[tokio::test]
async fn server_error_is_fatal() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &server.address());
    bot.session.lock().connect()?;
    let mut conn = server.accept_registered("Bot").await?;

    conn.send_raw("ERROR :Closing Link: Bot (Banned)").await?;
    let session = bot.session.clone();
    let err = bot.fatal_error().await?;
    assert!(matches!(err, SessionError::Protocol(ref d) if d == "Closing Link: Bot (Banned)"));
    assert_eq!(session.lock().state(), SessionState::Disconnected);
    Ok(())
}

#[tokio::test]
async fn server_hangup_is_fatal() -> anyhow::Result<()> {
    let server = MockServer::bind().await?;
    let bot = TestBot::for_server("Bot", &server.address());
    bot.session.lock().connect()?;
    let conn = server.accept_registered("Bot").await?;
    drop(conn);

    let err = bot.fatal_error().await?;
    assert!(matches!(err, SessionError::Network(_)));
    assert!(err.is_fatal());
    Ok(())
}

#[tokio::test]
async fn connection_refused_is_fatal() -> anyhow::Result<()> {
    let address = {
        let server = MockServer::bind().await?;
        server.address()
    };
    let bot = TestBot::for_server("Bot", &address);
    bot.session.lock().connect()?;

    let err = bot.fatal_error().await?;
    assert!(matches!(err, SessionError::Network(ref d) if d.contains("could not connect")));
    Ok(())
}
