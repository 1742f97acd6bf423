//! Seeded allocate/release workloads.
//!
//! A [`ChurnWorkload`] turns a seed into a reproducible stream of
//! [`Op`]s; a [`Replay`] applies them to a heap and keeps the set of live
//! addresses so that every generated release is valid.

use heapward_arena::{Address, Heap};
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// One step of a workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    /// Allocate `size` bytes.
    Alloc { size: usize },
    /// Allocate `count * size` zeroed bytes.
    Zeroed { count: usize, size: usize },
    /// Release the live allocation at index `slot % live.len()`.
    /// A no-op when nothing is live.
    Free { slot: usize },
}

/// Reproducible random mix of allocations and releases.
pub struct ChurnWorkload {
    rng: ChaCha8Rng,
    max_size: usize,
    free_percent: u64,
}

impl ChurnWorkload {
    /// A workload of requests up to `max_size` bytes where roughly
    /// `free_percent`% of ops are releases.
    pub fn new(seed: u64, max_size: usize, free_percent: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            max_size: max_size.max(1),
            free_percent: free_percent.min(100),
        }
    }

    /// Generate the next op.
    pub fn next_op(&mut self) -> Op {
        let roll = self.rng.next_u64() % 100;
        if roll < self.free_percent {
            return Op::Free {
                slot: self.rng.next_u64() as usize,
            };
        }
        let size = (self.rng.next_u64() % (self.max_size as u64 + 1)) as usize;
        if roll % 10 == 0 {
            let count = 1 + (self.rng.next_u64() % 8) as usize;
            Op::Zeroed {
                count,
                size: size / count,
            }
        } else {
            Op::Alloc { size }
        }
    }

    /// Generate `n` ops.
    pub fn ops(&mut self, n: usize) -> Vec<Op> {
        (0..n).map(|_| self.next_op()).collect()
    }
}

/// Applies ops to a heap, tracking live addresses.
#[derive(Debug, Default)]
pub struct Replay {
    pub live: Vec<Address>,
    pub successes: u64,
    pub failures: u64,
    pub releases: u64,
}

impl Replay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one op.
    pub fn apply(&mut self, heap: &mut Heap, op: Op) {
        match op {
            Op::Alloc { size } => self.record(heap.allocate(size)),
            Op::Zeroed { count, size } => self.record(heap.allocate_zeroed(count, size)),
            Op::Free { slot } => {
                if self.live.is_empty() {
                    return;
                }
                let address = self.live.swap_remove(slot % self.live.len());
                heap.release(Some(address))
                    .expect("replay only releases live addresses");
                self.releases += 1;
            }
        }
    }

    /// Apply every op in order.
    pub fn run(&mut self, heap: &mut Heap, ops: &[Op]) {
        for &op in ops {
            self.apply(heap, op);
        }
    }

    /// Release everything still live.
    pub fn drain(&mut self, heap: &mut Heap) {
        for address in self.live.drain(..) {
            heap.release(Some(address))
                .expect("replay only releases live addresses");
            self.releases += 1;
        }
    }

    fn record(&mut self, result: Option<Address>) {
        match result {
            Some(address) => {
                self.live.push(address);
                self.successes += 1;
            }
            None => self.failures += 1,
        }
    }
}
