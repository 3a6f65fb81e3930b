use std::{
    cell::RefCell,
    collections::VecDeque,
    fs::File,
    io::{self, BufReader, Cursor, Read},
};

/// a source of kernel cpu statistics.
pub trait StatsSource {
    /// returns a reader over one statistics table.
    fn open(&self) -> io::Result<impl Read>;
}

/// statistics backed by `/proc/stat`.
#[derive(Default)]
pub struct ProcStatFile;

/// a mock source replaying a fixed sequence of tables.
///
/// once the sequence is exhausted, `open` reports the source as unavailable,
/// which exercises the fail-soft sampling path.
#[derive(Default)]
pub struct MockStatSource {
    tables: RefCell<VecDeque<String>>,
}

// === impl ProcStatFile ===

impl StatsSource for ProcStatFile {
    fn open(&self) -> io::Result<impl Read> {
        File::open(Self::STAT).map(BufReader::new)
    }
}

impl ProcStatFile {
    const STAT: &str = "/proc/stat";
}

// === impl MockStatSource ===

impl StatsSource for MockStatSource {
    fn open(&self) -> io::Result<impl Read> {
        let Self { tables } = self;

        tables
            .borrow_mut()
            .pop_front()
            .map(Cursor::new)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "mock source exhausted"))
    }
}

impl MockStatSource {
    /// creates a mock that replays the given tables in order.
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tables: RefCell::new(tables.into_iter().map(Into::into).collect()),
        }
    }
}
