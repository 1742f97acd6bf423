//! Human-readable statistics dumps and leak reports.

use std::io::{self, Write};

use indexmap::IndexMap;

use heapward_core::Origin;

use crate::heap::Heap;

/// Live allocations attributed to one source location.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LeakSite {
    /// Number of regions still active.
    pub count: usize,
    /// Bytes in those regions.
    pub bytes: usize,
}

impl Heap {
    /// Write the two-line counter summary.
    pub fn write_statistics<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.stats)
    }

    /// Print the counter summary to stdout.
    pub fn print_statistics(&self) {
        let stdout = io::stdout();
        // Best-effort, like printf: a closed stdout is not the heap's problem.
        let _ = self.write_statistics(&mut stdout.lock());
    }

    /// Write one line per active region, in ascending address order.
    pub fn write_leak_report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (address, region) in self.active_regions() {
            writeln!(
                out,
                "LEAK CHECK: {}: allocated object {} with size {}",
                region.origin, address, region.size
            )?;
        }
        Ok(())
    }

    /// Print the leak report to stdout.
    pub fn print_leak_report(&self) {
        let stdout = io::stdout();
        let _ = self.write_leak_report(&mut stdout.lock());
    }

    /// Group active regions by allocation site.
    ///
    /// Sites appear in the order their lowest-addressed live region does.
    pub fn leak_summary(&self) -> IndexMap<Origin, LeakSite> {
        let mut sites: IndexMap<Origin, LeakSite> = IndexMap::new();
        for (_, region) in self.active_regions() {
            let site = sites.entry(region.origin.clone()).or_default();
            site.count += 1;
            site.bytes += region.size;
        }
        sites
    }
}
