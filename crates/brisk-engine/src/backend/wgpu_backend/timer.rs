//! Two-timestamp GPU timer queries.
//!
//! A query brackets one frame: timestamp 0 at the start of the frame's first
//! render pass, timestamp 1 at the end of its last. After submission the pair
//! is resolved, copied into a mappable buffer and mapped asynchronously; the
//! result is read by polling, never by waiting.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

const TIMESTAMP_BYTES: u64 = 2 * std::mem::size_of::<u64>() as u64;

const MAP_PENDING: u8 = 0;
const MAP_OK: u8 = 1;
const MAP_FAILED: u8 = 2;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum QueryState {
    /// Begun; timestamps will be written by the frame that ends it.
    Open,
    /// Ended; waiting for the frame to be encoded.
    Ended,
    /// Submitted and being mapped.
    Mapping,
    Done(u64),
    /// The frame it timed was never submitted.
    Lost,
}

pub(super) struct TimerQuery {
    set: wgpu::QuerySet,
    resolve: wgpu::Buffer,
    staging: wgpu::Buffer,
    mapped: Arc<AtomicU8>,
    state: QueryState,
}

impl TimerQuery {
    pub fn new(device: &wgpu::Device) -> Self {
        let set = device.create_query_set(&wgpu::QuerySetDescriptor {
            label: Some("brisk frame timer"),
            ty: wgpu::QueryType::Timestamp,
            count: 2,
        });

        let resolve = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("brisk frame timer resolve"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::QUERY_RESOLVE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("brisk frame timer staging"),
            size: TIMESTAMP_BYTES,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            set,
            resolve,
            staging,
            mapped: Arc::new(AtomicU8::new(MAP_PENDING)),
            state: QueryState::Open,
        }
    }

    /// Rearms a query taken from the free pool.
    pub fn reopen(&mut self) {
        self.mapped.store(MAP_PENDING, Ordering::SeqCst);
        self.state = QueryState::Open;
    }

    /// True when the query can go back to the free pool.
    pub fn is_reusable(&self) -> bool {
        self.state != QueryState::Mapping
    }

    pub fn end(&mut self) {
        if self.state == QueryState::Open {
            self.state = QueryState::Ended;
        }
    }

    pub fn is_ended(&self) -> bool {
        self.state == QueryState::Ended
    }

    pub fn mark_lost(&mut self) {
        self.state = QueryState::Lost;
    }

    pub fn timestamp_writes(&self, first: bool, last: bool) -> Option<wgpu::RenderPassTimestampWrites<'_>> {
        (first || last).then(|| wgpu::RenderPassTimestampWrites {
            query_set: &self.set,
            beginning_of_pass_write_index: first.then_some(0),
            end_of_pass_write_index: last.then_some(1),
        })
    }

    /// Resolves both timestamps and copies them into the staging buffer.
    pub fn encode_resolve(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.resolve_query_set(&self.set, 0..2, &self.resolve, 0);
        encoder.copy_buffer_to_buffer(&self.resolve, 0, &self.staging, 0, TIMESTAMP_BYTES);
    }

    /// Requests the mapping; must run after the copying submission.
    pub fn schedule_map(&mut self) {
        let flag = self.mapped.clone();
        self.state = QueryState::Mapping;
        self.staging.slice(..).map_async(wgpu::MapMode::Read, move |res| {
            let status = match res {
                Ok(()) => MAP_OK,
                Err(e) => {
                    log::error!("GPU timer map_async failed: {e:?}");
                    MAP_FAILED
                }
            };
            flag.store(status, Ordering::SeqCst);
        });
    }

    /// Elapsed nanoseconds once mapped; `period_ns` converts ticks.
    pub fn try_read(&mut self, period_ns: f32) -> Option<u64> {
        match self.state {
            QueryState::Done(ns) => Some(ns),
            QueryState::Mapping => match self.mapped.load(Ordering::SeqCst) {
                MAP_OK => self.read_mapped(period_ns),
                MAP_FAILED => {
                    self.state = QueryState::Lost;
                    None
                }
                _ => None,
            },
            _ => None,
        }
    }

    fn read_mapped(&mut self, period_ns: f32) -> Option<u64> {
        let data = self.staging.slice(..).get_mapped_range();
        let [start, end]: [u64; 2] = bytemuck::pod_read_unaligned(&data[..TIMESTAMP_BYTES as usize]);
        drop(data);
        self.staging.unmap();

        let ns = (end.saturating_sub(start) as f64 * f64::from(period_ns)) as u64;
        self.state = QueryState::Done(ns);
        Some(ns)
    }
}
