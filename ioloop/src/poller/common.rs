use std::os::fd::RawFd;

const WORD_BITS: usize = u64::BITS as usize;

/// A set of descriptors.
///
/// Stored as a growable bit vector, so insertion and lookup are O(1) and
/// there is no fixed ceiling. Iteration yields descriptors in ascending
/// order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FdSet {
    words: Vec<u64>,
    len: usize,
}

impl FdSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of descriptors in the set.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the set holds no descriptor.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds `fd`. Returns `false` if it was already present.
    ///
    /// # Panics
    ///
    /// Panics if `fd` is negative.
    pub fn insert(&mut self, fd: RawFd) -> bool {
        let (word, bit) = Self::locate(fd);

        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }

        let present = self.words[word] & bit != 0;
        if !present {
            self.words[word] |= bit;
            self.len += 1;
        }

        !present
    }

    /// Removes `fd`. Returns `true` if it was present.
    pub fn remove(&mut self, fd: RawFd) -> bool {
        if !self.contains(fd) {
            return false;
        }

        let (word, bit) = Self::locate(fd);
        self.words[word] &= !bit;
        self.len -= 1;

        true
    }

    /// Returns `true` if `fd` is in the set.
    pub fn contains(&self, fd: RawFd) -> bool {
        if fd < 0 {
            return false;
        }

        let (word, bit) = Self::locate(fd);
        self.words.get(word).is_some_and(|w| w & bit != 0)
    }

    /// Empties the set, keeping its storage.
    pub fn clear(&mut self) {
        self.words.iter_mut().for_each(|w| *w = 0);
        self.len = 0;
    }

    /// Highest descriptor in the set.
    pub fn max(&self) -> Option<RawFd> {
        self.iter().next_back()
    }

    /// Iterates over the descriptors in ascending order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = RawFd> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..WORD_BITS)
                .filter(move |bit| word & (1u64 << bit) != 0)
                .map(move |bit| (index * WORD_BITS + bit) as RawFd)
        })
    }

    fn locate(fd: RawFd) -> (usize, u64) {
        assert!(fd >= 0, "negative descriptor {fd} in FdSet");

        let fd = fd as usize;
        (fd / WORD_BITS, 1u64 << (fd % WORD_BITS))
    }
}

impl FromIterator<RawFd> for FdSet {
    fn from_iter<I: IntoIterator<Item = RawFd>>(iter: I) -> Self {
        let mut set = FdSet::new();
        for fd in iter {
            set.insert(fd);
        }
        set
    }
}

/// The read and write sets handed to a [`Poller`](super::Poller).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FdSets {
    /// Descriptors waited on for reading.
    pub read: FdSet,

    /// Descriptors waited on for writing.
    pub write: FdSet,
}

impl FdSets {
    /// Creates empty sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empties both sets.
    pub fn clear(&mut self) {
        self.read.clear();
        self.write.clear();
    }

    /// Returns `true` if neither set holds a descriptor.
    pub fn is_empty(&self) -> bool {
        self.read.is_empty() && self.write.is_empty()
    }

    /// Highest descriptor across both sets.
    pub fn max_fd(&self) -> Option<RawFd> {
        self.read.max().max(self.write.max())
    }

    /// Total number of (descriptor, direction) pairs.
    pub fn len(&self) -> usize {
        self.read.len() + self.write.len()
    }
}
