//! Test doubles: a loopback codec and a scripted UDP responder.
//!
//! The loopback wire format mirrors the RADIUS header
//! (`code | id | length | authenticator[16] | TLV attributes`) but signs
//! responses with BLAKE2s instead of MD5.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blake2::{Blake2s256, Digest};
use rand::RngCore;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;

use crate::core::{
    AttributeValue, Attributes, Code, Codec, CodecError, Request, Response, Secret,
    RFC2865_DICTIONARY,
};

pub const TEST_SECRET: &str = "testing123";

const HEADER_SIZE: usize = 20;
const TYPE_REPLY_MESSAGE: u8 = 18;

#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Integer,
    Octets,
}

fn dictionary_entries(name: &str) -> Option<&'static [(&'static str, u8, Kind)]> {
    const RFC2865: &[(&str, u8, Kind)] = &[
        ("User-Name", 1, Kind::Text),
        ("User-Password", 2, Kind::Octets),
        ("NAS-Port", 5, Kind::Integer),
        ("Reply-Message", TYPE_REPLY_MESSAGE, Kind::Text),
        ("State", 24, Kind::Octets),
    ];
    const RFC2869: &[(&str, u8, Kind)] = &[
        ("EAP-Message", 79, Kind::Octets),
        ("Message-Authenticator", 80, Kind::Octets),
    ];
    match name {
        RFC2865_DICTIONARY => Some(RFC2865),
        "rfc2869" => Some(RFC2869),
        _ => None,
    }
}

/// In-memory codec with a per-instance dictionary registry.
#[derive(Default)]
pub struct LoopbackCodec {
    by_name: Mutex<HashMap<String, (u8, Kind)>>,
    by_type: Mutex<HashMap<u8, (String, Kind)>>,
    registered: Mutex<Vec<String>>,
    encodes: AtomicUsize,
    next_id: AtomicU8,
    panic_on_decode: AtomicBool,
    last_message_authenticator: AtomicBool,
}

impl LoopbackCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rfc2865() -> Self {
        let codec = Self::new();
        codec.add_dictionary(RFC2865_DICTIONARY).unwrap();
        codec
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn encode_count(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }

    pub fn last_message_authenticator(&self) -> bool {
        self.last_message_authenticator.load(Ordering::SeqCst)
    }

    pub fn panic_on_decode(&self, enabled: bool) {
        self.panic_on_decode.store(enabled, Ordering::SeqCst);
    }
}

impl Codec for LoopbackCodec {
    fn add_dictionary(&self, name: &str) -> Result<(), CodecError> {
        let entries =
            dictionary_entries(name).ok_or_else(|| CodecError::UnknownDictionary(name.into()))?;
        let mut by_name = self.by_name.lock().unwrap();
        let mut by_type = self.by_type.lock().unwrap();
        for &(attr, ty, kind) in entries {
            by_name.insert(attr.to_string(), (ty, kind));
            by_type.insert(ty, (attr.to_string(), kind));
        }
        self.registered.lock().unwrap().push(name.to_string());
        Ok(())
    }

    fn encode(&self, request: &Request, _secret: &Secret) -> Result<Vec<u8>, CodecError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        self.last_message_authenticator
            .store(request.message_authenticator, Ordering::SeqCst);

        let mut authenticator = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut authenticator);

        let mut packet = vec![request.code.0, self.next_id.fetch_add(1, Ordering::SeqCst), 0, 0];
        packet.extend_from_slice(&authenticator);

        let by_name = self.by_name.lock().unwrap();
        for (name, value) in request.attributes.iter() {
            let &(ty, kind) = by_name
                .get(name)
                .ok_or_else(|| CodecError::UnknownAttribute(name.into()))?;
            let bytes = match (kind, value) {
                (Kind::Text, AttributeValue::Text(s)) => s.as_bytes().to_vec(),
                (Kind::Integer, AttributeValue::Integer(n)) => n.to_be_bytes().to_vec(),
                (Kind::Octets, AttributeValue::Octets(b)) => b.clone(),
                (Kind::Octets, AttributeValue::Text(s)) => s.as_bytes().to_vec(),
                _ => {
                    return Err(CodecError::InvalidValue {
                        attribute: name.into(),
                        reason: format!("expected {kind:?}"),
                    });
                }
            };
            push_tlv(&mut packet, ty, &bytes);
        }
        set_length(&mut packet);
        Ok(packet)
    }

    fn decode(&self, packet: &[u8], _secret: &Secret) -> Result<Response, CodecError> {
        if self.panic_on_decode.load(Ordering::SeqCst) {
            panic!("decoder exploded");
        }
        if packet.len() < HEADER_SIZE {
            return Err(CodecError::Malformed(format!("{} bytes", packet.len())));
        }
        let declared = u16::from_be_bytes([packet[2], packet[3]]) as usize;
        if declared != packet.len() {
            return Err(CodecError::Malformed(format!(
                "length field {declared}, datagram {}",
                packet.len()
            )));
        }

        let by_type = self.by_type.lock().unwrap();
        let mut attributes = Attributes::new();
        let mut rest = &packet[HEADER_SIZE..];
        while !rest.is_empty() {
            if rest.len() < 2 || (rest[1] as usize) < 2 || rest[1] as usize > rest.len() {
                return Err(CodecError::Malformed("truncated attribute".into()));
            }
            let (ty, len) = (rest[0], rest[1] as usize);
            let value = &rest[2..len];
            let (name, kind) = by_type
                .get(&ty)
                .ok_or_else(|| CodecError::UnknownAttribute(format!("type {ty}")))?;
            let value = match kind {
                Kind::Text => AttributeValue::Text(String::from_utf8_lossy(value).into_owned()),
                Kind::Integer => {
                    let raw: [u8; 4] = value
                        .try_into()
                        .map_err(|_| CodecError::Malformed(format!("{name} length")))?;
                    AttributeValue::Integer(u32::from_be_bytes(raw))
                }
                Kind::Octets => AttributeValue::Octets(value.to_vec()),
            };
            attributes.push(name.clone(), value);
            rest = &rest[len..];
        }

        Ok(Response {
            code: Code(packet[0]),
            identifier: packet[1],
            attributes,
        })
    }

    fn verify_response(&self, response: &[u8], request: &[u8], secret: &Secret) -> bool {
        if response.len() < HEADER_SIZE || request.len() < HEADER_SIZE {
            return false;
        }
        if response[1] != request[1] {
            return false;
        }
        response_authenticator(response, request, secret.expose()) == response[4..20]
    }
}

fn push_tlv(packet: &mut Vec<u8>, ty: u8, value: &[u8]) {
    packet.push(ty);
    packet.push((value.len() + 2) as u8);
    packet.extend_from_slice(value);
}

fn set_length(packet: &mut [u8]) {
    let len = (packet.len() as u16).to_be_bytes();
    packet[2..4].copy_from_slice(&len);
}

fn response_authenticator(response: &[u8], request: &[u8], secret: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2s256::new();
    hasher.update(&response[..4]);
    hasher.update(&request[4..20]);
    hasher.update(&response[HEADER_SIZE..]);
    hasher.update(secret);
    let digest = hasher.finalize();
    let mut out = [0u8; 16];
    out.copy_from_slice(&digest[..16]);
    out
}

/// Build a signed reply to `request`.
pub fn build_reply(request: &[u8], code: Code, reply_message: Option<&str>, secret: &[u8]) -> Vec<u8> {
    let mut packet = vec![code.0, request[1], 0, 0];
    packet.extend_from_slice(&[0u8; 16]);
    if let Some(text) = reply_message {
        push_tlv(&mut packet, TYPE_REPLY_MESSAGE, text.as_bytes());
    }
    set_length(&mut packet);
    let authenticator = response_authenticator(&packet, request, secret);
    packet[4..20].copy_from_slice(&authenticator);
    packet
}

/// What the scripted server does with one incoming request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Reply with a correctly signed packet.
    Respond {
        code: Code,
        reply_message: Option<&'static str>,
    },
    /// Never reply.
    Ignore,
    /// Reply with an Access-Accept signed under the wrong secret.
    Forged,
    /// Reply with bytes that do not parse.
    Garbage,
    /// Wait, then act.
    Delayed(Duration, Box<Reply>),
    /// Two signed replies back to back.
    Twice(Code, Code),
}

impl Reply {
    pub fn accept() -> Self {
        Reply::code(Code::ACCESS_ACCEPT)
    }

    pub fn code(code: Code) -> Self {
        Reply::Respond {
            code,
            reply_message: None,
        }
    }

    pub fn reject(message: &'static str) -> Self {
        Reply::Respond {
            code: Code::ACCESS_REJECT,
            reply_message: Some(message),
        }
    }

    fn datagrams(&self, request: &[u8]) -> Vec<Vec<u8>> {
        let secret = TEST_SECRET.as_bytes();
        match self {
            Reply::Respond {
                code,
                reply_message,
            } => vec![build_reply(request, *code, *reply_message, secret)],
            Reply::Ignore => Vec::new(),
            Reply::Forged => vec![build_reply(request, Code::ACCESS_ACCEPT, None, b"wrong-secret")],
            Reply::Garbage => vec![vec![0xde, 0xad]],
            Reply::Delayed(_, inner) => inner.datagrams(request),
            Reply::Twice(first, second) => vec![
                build_reply(request, *first, None, secret),
                build_reply(request, *second, None, secret),
            ],
        }
    }
}

/// A request seen by the scripted server.
#[derive(Debug, Clone)]
pub struct Received {
    pub from: SocketAddr,
    pub bytes: Vec<u8>,
}

/// UDP responder on 127.0.0.1 that follows a script, one entry per request.
///
/// Once the script runs out the last entry repeats.
pub struct ScriptedServer {
    addr: SocketAddr,
    received: Arc<Mutex<Vec<Received>>>,
    task: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn start(script: Vec<Reply>) -> Self {
        let socket = Arc::new(UdpSocket::bind("127.0.0.1:0").await.unwrap());
        let addr = socket.local_addr().unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));

        let log = Arc::clone(&received);
        let task = tokio::spawn(async move {
            let mut buf = vec![0u8; 4096];
            let mut index = 0usize;
            loop {
                let Ok((len, from)) = socket.recv_from(&mut buf).await else {
                    continue;
                };
                let bytes = buf[..len].to_vec();
                log.lock().unwrap().push(Received {
                    from,
                    bytes: bytes.clone(),
                });

                let Some(reply) = script.get(index).or(script.last()).cloned() else {
                    continue;
                };
                index += 1;

                let socket = Arc::clone(&socket);
                tokio::spawn(async move {
                    if let Reply::Delayed(delay, _) = &reply {
                        tokio::time::sleep(*delay).await;
                    }
                    for datagram in reply.datagrams(&bytes) {
                        let _ = socket.send_to(&datagram, from).await;
                    }
                });
            }
        });

        Self {
            addr,
            received,
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn received(&self) -> Vec<Received> {
        self.received.lock().unwrap().clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loopback_reply_verifies() {
        let codec = LoopbackCodec::with_rfc2865();
        let secret = Secret::from(TEST_SECRET);
        let request = codec
            .encode(
                &Request::new(Code::ACCESS_REQUEST, Attributes::new().with("User-Name", "alice")),
                &secret,
            )
            .unwrap();

        let reply = build_reply(&request, Code::ACCESS_REJECT, Some("nope"), secret.expose());
        assert!(codec.verify_response(&reply, &request, &secret));

        let response = codec.decode(&reply, &secret).unwrap();
        assert_eq!(response.code, Code::ACCESS_REJECT);
        assert_eq!(response.reply_message(), Some("nope"));

        let forged = build_reply(&request, Code::ACCESS_ACCEPT, None, b"other");
        assert!(!codec.verify_response(&forged, &request, &secret));
        assert_eq!(hex::encode(&forged[..4]), format!("02{:02x}0014", request[1]));
    }
}
