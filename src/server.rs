use std::{error, fmt, sync::Arc};

use rand::{thread_rng, Rng};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::{mpsc, Notify},
};

use crate::{
    compliance::ComplianceMode,
    cookies::CookieParser,
    handler::Handler,
    parser::{ParseError, Parser},
    response::Response,
    status,
};

#[derive(Debug)]
pub enum ServerError {
    Bind(String),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServerError::Bind(err) => write!(f, "could not bind listener: {}", err),
        }
    }
}

impl error::Error for ServerError {}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct ConnId(pub String);

impl ConnId {
    fn new() -> Self {
        ConnId(format!("{:08x}", thread_rng().gen::<u32>()))
    }
}

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct Server {
    address: String,
    port: u16,
    base_url: String,
    cookie_parser: CookieParser,
    default_handler: Option<Arc<dyn Handler>>,
    start_notifier: Arc<Notify>,
    done_notifier: Arc<Notify>,
    shutdown_tx: Arc<mpsc::Sender<bool>>,
    shutdown_rx: mpsc::Receiver<bool>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Server: {}:{}, cookie compliance: {}",
            self.address,
            self.port,
            self.cookie_parser.mode()
        )
    }
}

impl Server {
    pub fn new<T: Into<String>>(address: T, port: u16) -> Self {
        let address = address.into();
        let base_url = format!("http://{}:{}", address, port);
        let (tx, rx) = mpsc::channel(1);

        Self {
            address,
            port,
            base_url,
            cookie_parser: CookieParser::default(),
            default_handler: None,
            start_notifier: Arc::new(Notify::new()),
            done_notifier: Arc::new(Notify::new()),
            shutdown_tx: Arc::new(tx),
            shutdown_rx: rx,
        }
    }

    /// Sets the Cookie header grammar for every connection on this server.
    pub fn with_compliance(mut self, mode: ComplianceMode) -> Self {
        self.cookie_parser = CookieParser::new(mode);
        self
    }

    pub fn compliance(&self) -> ComplianceMode {
        self.cookie_parser.mode()
    }

    pub fn route_default(&mut self, handler: impl Handler + 'static) {
        self.default_handler = Some(Arc::new(handler));
    }

    pub fn start_notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.start_notifier)
    }

    pub fn shutdown(&self) -> (Arc<mpsc::Sender<bool>>, Arc<Notify>) {
        (
            Arc::clone(&self.shutdown_tx),
            Arc::clone(&self.done_notifier),
        )
    }

    pub async fn start(&mut self) -> Result<(), ServerError> {
        let hostport = format!("{}:{}", self.address, self.port);
        let listener = TcpListener::bind(&hostport)
            .await
            .map_err(|e| ServerError::Bind(format!("{}: {}", hostport, e)))?;
        info!(
            "Listening on {} (cookie compliance: {})",
            hostport,
            self.cookie_parser.mode()
        );

        let shutdown_notifier = Arc::new(Notify::new());

        // Let tests know we're ready
        self.start_notifier.notify_one();

        loop {
            let socket = tokio::select! {
                result = listener.accept() => match result {
                    Ok((socket, _)) => socket,
                    Err(e) => {
                        warn!("accept failed: {}", e);
                        continue;
                    }
                },
                _ = self.shutdown_rx.recv() => {
                    shutdown_notifier.notify_waiters();
                    info!("Shutting down...");
                    break;
                }
            };

            let conn = ConnectedServer {
                id: ConnId::new(),
                base_url: self.base_url.clone(),
                cookie_parser: self.cookie_parser,
                default_handler: self.default_handler.clone(),
                shutdown_notifier: Arc::clone(&shutdown_notifier),
            };

            tokio::spawn(async move {
                conn.process_connection(socket).await;
            });
        }

        // Let tests know we're done
        self.done_notifier.notify_one();

        Ok(())
    }
}

struct ConnectedServer {
    id: ConnId,
    base_url: String,
    cookie_parser: CookieParser,
    default_handler: Option<Arc<dyn Handler>>,
    shutdown_notifier: Arc<Notify>,
}

impl ConnectedServer {
    async fn respond(&self, s: &mut TcpStream, mut response: Response) {
        let buf = response.serialize();
        if let Err(e) = s.write_all(buf.as_bytes()).await {
            // The client may already have hung up.
            debug!("Connection ID {}: could not write response: {}", self.id, e);
            return;
        }
        _ = s.shutdown().await;
    }

    async fn process_connection(&self, mut s: TcpStream) {
        match s.peer_addr() {
            Ok(addr) => info!("Connection ID {} received from {}", self.id, addr),
            Err(_) => info!("Connection ID {} received", self.id),
        }

        let mut parser = Parser::new(&self.base_url, self.cookie_parser);
        let mut buf = [0u8; 16384];

        while !parser.is_complete() {
            let result = tokio::select! {
                r = s.read(&mut buf) => r,
                _ = self.shutdown_notifier.notified() => {
                    debug!("Shutting down connection {}...", self.id);
                    return;
                }
            };

            let parsed = match result {
                Ok(0) => {
                    debug!("Connection ID {}: peer closed", self.id);
                    parser.parse_eof()
                }
                Ok(n) => {
                    debug!("read {} bytes", n);
                    parser.parse_buf(&buf[..n])
                }
                Err(e) => {
                    debug!("connection closed: {:?}", e);
                    return;
                }
            };

            match parsed {
                Ok(()) => {}
                Err(ParseError::UnexpectedEOF) => {
                    debug!("Connection ID {}: no request received", self.id);
                    return;
                }
                Err(e) => {
                    warn!("Connection ID {}: {}", self.id, e);
                    let response = Response::new(status::BAD_REQUEST).with_body(e.to_string());
                    self.respond(&mut s, response).await;
                    return;
                }
            }
        }

        let request = parser.into_request();
        debug!("Request: {:?}", request);

        let response = match &self.default_handler {
            Some(handler) => match handler.handle(&request).await {
                Ok(response) => response,
                Err(error) => {
                    error!("Error from handler: {}", error);
                    error.to_response()
                }
            },
            None => Response::new(status::NOT_FOUND).with_body("no route handlers installed"),
        };

        self.respond(&mut s, response).await;
        debug!("Closed connection {}", self.id);
    }
}
