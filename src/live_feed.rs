//! Live-feed viewport: selection state machine plus the MJPEG stream reader.
//!
//! Selection only ever moves forward: clicking a live marker points the
//! viewport at that camera, and nothing clears it automatically. If the
//! selected location later disappears from a snapshot the card keeps showing
//! whatever the stream still delivers.
//!
//! The video endpoint serves `multipart/x-mixed-replace` JPEG parts. A
//! background task reads the byte stream, carves complete JPEGs out of it,
//! decodes them off the UI thread, and hands frames over a channel. Each
//! frame is tagged with its location id so frames from a superseded stream
//! are dropped instead of flickering into the new selection.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::mpsc;

use egui::Color32;
use egui::ColorImage;
use egui::RichText;
use egui::TextureOptions;
use jiff::Timestamp;
use tokio::runtime::Runtime;
use tracing::debug;
use tracing::warn;

use crate::error::ConsoleError;
use crate::icons;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Cap on buffered stream bytes while hunting for frame markers. A stream
/// that never produces a complete JPEG gets its buffer dropped rather than
/// growing without bound.
const MAX_STREAM_BUFFER: usize = 8 * 1024 * 1024;

/// Process-local viewport state. Lives for the whole session; there is no
/// automatic transition back to `Empty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveFeedSelection {
    Empty,
    Showing {
        location_id: String,
        name: String,
        selected_at: Timestamp,
    },
}

impl LiveFeedSelection {
    pub fn location_id(&self) -> Option<&str> {
        match self {
            LiveFeedSelection::Empty => None,
            LiveFeedSelection::Showing { location_id, .. } => Some(location_id),
        }
    }
}

/// One decoded frame from a camera stream.
pub struct LiveFrame {
    pub location_id: String,
    pub image: ColorImage,
}

pub struct LiveFeedCard {
    base_url: String,
    // Separate client from the poller: streams run indefinitely, so no
    // request timeout here.
    client: reqwest::Client,
    selection: LiveFeedSelection,
    frame_rx: Option<mpsc::Receiver<LiveFrame>>,
    texture: Option<egui::TextureHandle>,
    stop_stream: Option<Arc<AtomicBool>>,
}

impl LiveFeedCard {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
            selection: LiveFeedSelection::Empty,
            frame_rx: None,
            texture: None,
            stop_stream: None,
        }
    }

    pub fn selection(&self) -> &LiveFeedSelection {
        &self.selection
    }

    /// Select a live camera and start streaming it, replacing any stream
    /// already running.
    pub fn select(&mut self, runtime: &Runtime, ctx: &egui::Context, location_id: &str, name: &str) {
        let url = self.transition(location_id, name, Timestamp::now());

        if let Some(stop) = self.stop_stream.take() {
            stop.store(true, Ordering::Relaxed);
        }
        let stop = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel();
        self.frame_rx = Some(rx);
        self.stop_stream = Some(Arc::clone(&stop));

        let client = self.client.clone();
        let id = location_id.to_string();
        let ctx = ctx.clone();
        runtime.spawn(async move {
            if let Err(e) = stream_frames(client, url, id.clone(), tx, stop, ctx).await {
                warn!("live feed stream for {id} ended: {e}");
            }
        });
    }

    /// The pure part of `select`: advance the state machine and produce the
    /// stream URL.
    fn transition(&mut self, location_id: &str, name: &str, selected_at: Timestamp) -> String {
        self.selection = LiveFeedSelection::Showing {
            location_id: location_id.to_string(),
            name: name.to_string(),
            selected_at,
        };
        video_url(&self.base_url, location_id, selected_at)
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        if let Some(rx) = &self.frame_rx
            && let Some(image) = newest_matching_frame(rx, self.selection.location_id())
        {
            match &mut self.texture {
                Some(texture) => texture.set(image, TextureOptions::LINEAR),
                None => {
                    self.texture =
                        Some(ui.ctx().load_texture("live_feed_frame", image, TextureOptions::LINEAR));
                }
            }
        }

        match &self.selection {
            LiveFeedSelection::Empty => {
                ui.label(
                    RichText::new("Click a live camera marker to open its feed.")
                        .color(Color32::GRAY),
                );
            }
            LiveFeedSelection::Showing { name, selected_at, .. } => {
                ui.horizontal(|ui| {
                    // Recording indicator.
                    ui.label(RichText::new(icons::RECORD).color(Color32::RED));
                    ui.label(RichText::new("REC").color(Color32::RED).small());
                    ui.label(RichText::new(name).strong())
                        .on_hover_text(format!("Selected at {selected_at}"));
                });
                if let Some(texture) = &self.texture {
                    let size = texture.size_vec2();
                    let width = ui.available_width().min(320.0);
                    let height = width * size.y / size.x;
                    ui.image((texture.id(), egui::vec2(width, height)));
                } else {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Connecting to stream...");
                    });
                }
            }
        }
    }
}

/// `t` is cache-busting only, never semantic.
pub fn video_url(base_url: &str, location_id: &str, selected_at: Timestamp) -> String {
    format!(
        "{base_url}/video_feed/{location_id}?t={}",
        selected_at.as_millisecond()
    )
}

/// Drain all queued frames, keeping only the newest one belonging to the
/// current selection. Frames from a superseded stream are discarded.
fn newest_matching_frame(
    rx: &mpsc::Receiver<LiveFrame>,
    current: Option<&str>,
) -> Option<ColorImage> {
    let mut latest = None;
    while let Ok(frame) = rx.try_recv() {
        if Some(frame.location_id.as_str()) == current {
            latest = Some(frame.image);
        }
    }
    latest
}

async fn stream_frames(
    client: reqwest::Client,
    url: String,
    location_id: String,
    tx: mpsc::Sender<LiveFrame>,
    stop: Arc<AtomicBool>,
    ctx: egui::Context,
) -> Result<(), ConsoleError> {
    let mut response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Err(ConsoleError::UnexpectedStatus(response.status()));
    }

    let mut buffer: Vec<u8> = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        if stop.load(Ordering::Relaxed) {
            break;
        }

        buffer.extend_from_slice(&chunk);
        if buffer.len() > MAX_STREAM_BUFFER {
            debug!("live feed buffer overran without a complete frame, dropping it");
            buffer.clear();
            continue;
        }

        for jpeg in drain_complete_frames(&mut buffer) {
            match decode_frame(&jpeg) {
                Ok(image) => {
                    if tx.send(LiveFrame { location_id: location_id.clone(), image }).is_err() {
                        // UI dropped the receiver; stream no longer wanted.
                        return Ok(());
                    }
                    ctx.request_repaint();
                }
                Err(e) => debug!("skipping undecodable frame: {e}"),
            }
        }
    }

    Ok(())
}

/// Carve complete JPEGs (SOI..=EOI) out of the stream buffer, leaving any
/// trailing partial frame in place. Multipart boundary text between frames
/// is discarded along the way.
fn drain_complete_frames(buffer: &mut Vec<u8>) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    loop {
        let Some(start) = find(buffer, SOI, 0) else {
            // Nothing but boundary/header bytes; no frame can start in here.
            buffer.clear();
            break;
        };
        let Some(end) = find(buffer, EOI, start + SOI.len()) else {
            if start > 0 {
                buffer.drain(..start);
            }
            break;
        };
        frames.push(buffer[start..end + EOI.len()].to_vec());
        buffer.drain(..end + EOI.len());
    }
    frames
}

fn find(haystack: &[u8], needle: [u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|i| i + from)
}

fn decode_frame(jpeg: &[u8]) -> Result<ColorImage, ConsoleError> {
    let decoded = image::load_from_memory(jpeg)?;
    let rgba = decoded.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice()))
}
