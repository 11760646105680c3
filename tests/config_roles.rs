//! Configuration file → server and client, the way the binary wires them.

use std::fs;
use std::time::Duration;

use word_pager::{ClientConfig, Config, PageServer, PaginationClient, ServerConfig, WordList};

#[tokio::test]
async fn config_file_drives_both_roles() {
    let dir = tempfile::tempdir().unwrap();
    let words_path = dir.path().join("words.txt");
    fs::write(&words_path, "pear, apple,fig,\napple, kiwi,pear,apple").unwrap();

    let config_path = dir.path().join("config.json");
    fs::write(
        &config_path,
        format!(
            r#"{{"server_ip":"127.0.0.1","filename":{:?},"k":3,"p":1,
                "num_iterations":2,"io_timeout_ms":2000}}"#,
            words_path.display().to_string()
        ),
    )
    .unwrap();

    let cfg = Config::load(&config_path).unwrap();

    let mut server_cfg = ServerConfig::from_config(&cfg);
    server_cfg.port = 0;
    let words = WordList::load(&server_cfg.word_file).unwrap();
    assert_eq!(words.len(), 7);
    let server = PageServer::from_config(&server_cfg, words).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(server.run());

    let mut client_cfg = ClientConfig::from_config(&cfg);
    client_cfg.port = addr.port();
    assert_eq!(client_cfg.io_timeout, Some(Duration::from_millis(2000)));

    let client = PaginationClient::from_config(&client_cfg);
    let summary = client
        .fetch_repeated(
            client_cfg.start_offset,
            client_cfg.page_size.unwrap(),
            client_cfg.repetitions,
        )
        .await
        .unwrap();

    // Offset 1 skips the first "pear".
    let sorted = summary.table.sorted();
    assert_eq!(sorted, [("apple", 3), ("fig", 1), ("kiwi", 1), ("pear", 1)]);
    assert_eq!(summary.rounds, 2);
    handle.abort();
}

#[tokio::test]
async fn bind_failure_is_reported() {
    let first = PageServer::bind("127.0.0.1", 0, WordList::default())
        .await
        .unwrap();
    let port = first.local_addr().unwrap().port();

    let err = PageServer::bind("127.0.0.1", port, WordList::default())
        .await
        .err()
        .expect("second bind on the same port must fail");
    assert!(err.to_string().contains(&port.to_string()), "{err}");
}
