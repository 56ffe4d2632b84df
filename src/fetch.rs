use std::io::Read;
use std::time::Duration;

use flate2::read::GzDecoder;
use mvt_reader::Reader;
use reqwest::header::{ACCEPT_ENCODING, CONTENT_ENCODING, USER_AGENT};
use serde::Serialize;

use crate::error::FetchError;
use crate::tiles::{TileCoord, expand_url};

const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSample {
    pub name: String,
    pub feature_count: u64,
}

/// Outcome of fetching and decoding one tile.
///
/// `byte_size` is the length of the body as received, so it is the
/// compressed size whenever the server gzipped the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileResult {
    pub coord: TileCoord,
    pub byte_size: u64,
    pub total_features: u64,
    pub layers: Vec<LayerSample>,
}

impl TileResult {
    pub fn new(coord: TileCoord, byte_size: u64, layers: Vec<LayerSample>) -> Self {
        let total_features = layers.iter().map(|layer| layer.feature_count).sum();
        Self {
            coord,
            byte_size,
            total_features,
            layers,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_encoding: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_encoding: None,
            body,
        }
    }

    pub fn is_gzip(&self) -> bool {
        self.content_encoding
            .as_deref()
            .is_some_and(|value| value.to_ascii_lowercase().contains("gzip"))
    }
}

/// Transport used by the fetcher, so runs can be driven without a network.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str, accept_gzip: bool) -> Result<HttpResponse, FetchError>;
}

/// Blocking reqwest transport.
///
/// reqwest is built without its `gzip` feature, so bodies are handed back
/// exactly as they came off the wire.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(USER_AGENT, format!("vt-probe/{CRATE_VERSION}").parse()?);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|err| anyhow::anyhow!("failed to create HTTP client: {err}"))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, accept_gzip: bool) -> Result<HttpResponse, FetchError> {
        let transport = |err: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        };
        let mut request = self.client.get(url);
        if accept_gzip {
            request = request.header(ACCEPT_ENCODING, "gzip");
        }
        let response = request.send().map_err(transport)?;
        let status = response.status().as_u16();
        let content_encoding = response
            .headers()
            .get(CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().map_err(transport)?.to_vec();
        Ok(HttpResponse {
            status,
            content_encoding,
            body,
        })
    }
}

pub fn gunzip(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded)?;
    Ok(decoded)
}

/// Layer names and feature counts, in payload order.
pub fn decode_layers(payload: Vec<u8>) -> Result<Vec<LayerSample>, String> {
    let reader = Reader::new(payload).map_err(|err| format!("decode vector tile: {err}"))?;
    let layers = reader
        .get_layer_metadata()
        .map_err(|err| format!("read layer metadata: {err}"))?;
    Ok(layers
        .into_iter()
        .map(|layer| LayerSample {
            name: layer.name,
            feature_count: layer.feature_count as u64,
        })
        .collect())
}

pub fn fetch_tile(
    client: &dyn HttpClient,
    url_template: &str,
    zoom: u8,
    coord: TileCoord,
    allow_gzip: bool,
) -> Result<TileResult, FetchError> {
    let url = expand_url(url_template, zoom, coord);
    let response = client.get(&url, allow_gzip)?;
    if !(200..300).contains(&response.status) {
        return Err(FetchError::Status {
            url,
            status: response.status,
        });
    }

    let byte_size = response.body.len() as u64;
    let payload = if allow_gzip && response.is_gzip() {
        gunzip(&response.body).map_err(|source| FetchError::Decompress {
            url: url.clone(),
            source,
        })?
    } else {
        response.body
    };
    let layers = decode_layers(payload).map_err(|message| FetchError::Decode {
        url: url.clone(),
        message,
    })?;

    let result = TileResult::new(coord, byte_size, layers);
    tracing::debug!(
        url = %url,
        bytes = result.byte_size,
        features = result.total_features,
        layers = result.layers.len(),
        "fetched tile"
    );
    Ok(result)
}
