#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const CORPUS_DIR: &str = "CDR_Data/CDR.Corpus.v010516";

pub const TRAINING: &[u8] = b"<collection><source>PubTator</source><document>train</document></collection>";
pub const DEVELOPMENT: &[u8] = b"<collection><source>PubTator</source><document>dev</document></collection>";
pub const TEST: &[u8] = b"<collection><source>PubTator</source><document>test</document></collection>";

/// Zip laid out like the published CDR_Data.zip, plus a few unrelated files.
pub fn cdr_archive() -> Vec<u8> {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let entries: [(String, &[u8]); 5] = [
        ("CDR_Data/README.txt".to_string(), b"BioCreative V CDR task corpus"),
        (format!("{CORPUS_DIR}/CDR_TrainingSet.BioC.xml"), TRAINING),
        (format!("{CORPUS_DIR}/CDR_DevelopmentSet.BioC.xml"), DEVELOPMENT),
        (format!("{CORPUS_DIR}/CDR_TestSet.BioC.xml"), TEST),
        (format!("{CORPUS_DIR}/CDR_TestSet.PubTator.txt"), b"pubtator"),
    ];
    for (name, content) in entries {
        writer.start_file(name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Minimal HTTP/1.1 responder answering every request with the same body.
pub struct TestServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn serve(status: u16, body: Vec<u8>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        std::thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let reason = if status == 200 { "OK" } else { "Error" };
                let header = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/zip\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    body.len()
                );
                let _ = stream.write_all(header.as_bytes());
                let _ = stream.write_all(&body);
                let _ = stream.flush();
            }
        });

        Self {
            url: format!("http://127.0.0.1:{port}/media/store/files/2016/CDR_Data.zip"),
            hits,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}
