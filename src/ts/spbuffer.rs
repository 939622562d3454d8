//! The single-producer buffer behind every member of the timestamped buffer
//! family: a private, singly-linked list one producer appends to and every
//! consumer may scan and remove from.
//!
//! Each producer owns exactly one [`SpBuffer`]. Only the owner ever writes
//! `insert`; `remove` is advanced by whichever consumer wins the race to
//! take the oldest element, via CAS, so multiple consumers can safely share
//! a producer's buffer.

use std::sync::atomic::{AtomicBool, AtomicPtr, AtomicU64, Ordering};

use crate::payload::Payload;

struct Item<T> {
    next: AtomicPtr<Item<T>>,
    data: T,
    timestamp: AtomicU64,
}

/// A single producer's append-only list plus a shared remove cursor.
///
/// Nodes are heap-allocated with `Box::into_raw` and never freed, as with
/// the rest of this crate's node types.
pub struct SpBuffer<T: Payload> {
    insert: AtomicPtr<Item<T>>,
    remove: AtomicPtr<Item<T>>,
}

impl<T: Payload> SpBuffer<T> {
    pub fn new() -> Self {
        let sentinel = Box::into_raw(Box::new(Item {
            next: AtomicPtr::new(std::ptr::null_mut()),
            data: T::EMPTY,
            timestamp: AtomicU64::new(0),
        }));
        SpBuffer {
            insert: AtomicPtr::new(sentinel),
            remove: AtomicPtr::new(sentinel),
        }
    }

    /// Appends `item` stamped with `timestamp`. Only the owning producer
    /// thread may call this.
    pub fn insert(&self, item: T, timestamp: u64) {
        let node = Box::into_raw(Box::new(Item {
            next: AtomicPtr::new(std::ptr::null_mut()),
            data: item,
            timestamp: AtomicU64::new(timestamp),
        }));
        let old_insert = self.insert.load(Ordering::Relaxed);
        unsafe { (*old_insert).next.store(node, Ordering::Release) };
        self.insert.store(node, Ordering::Release);
    }

    /// Returns `(head_pointer, timestamp)` of the oldest unremoved element,
    /// without removing it, or `None` if the buffer looks empty to this
    /// observer.
    fn peek(&self) -> Option<(*mut Item<T>, u64, *mut Item<T>)> {
        let remove = self.remove.load(Ordering::Acquire);
        let insert = self.insert.load(Ordering::Acquire);
        if remove == insert {
            return None;
        }
        let head = unsafe { (*remove).next.load(Ordering::Acquire) };
        if head.is_null() {
            return None;
        }
        let timestamp = unsafe { (*head).timestamp.load(Ordering::Acquire) };
        Some((head, timestamp, remove))
    }

    /// The timestamp of the oldest unremoved element, for callers that only
    /// need to compare ages across producers before committing to a
    /// removal.
    pub fn oldest_timestamp(&self) -> Option<u64> {
        self.peek().map(|(_, ts, _)| ts)
    }

    /// Removes the element at `head` if the remove cursor is still at
    /// `old_remove`, i.e. nobody else took it first. Returns the removed
    /// value on success.
    pub fn try_remove_oldest(&self, head: *mut Item<T>, old_remove: *mut Item<T>) -> Option<T> {
        if self
            .remove
            .compare_exchange(old_remove, head, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            Some(unsafe { (*head).data })
        } else {
            None
        }
    }

    /// Convenience wrapper combining `peek` and `try_remove_oldest` for the
    /// common "take the oldest element from this one buffer" case.
    pub fn take_oldest_if(&self, max_timestamp: u64) -> RemoveAttempt<T> {
        match self.peek() {
            None => RemoveAttempt::Empty,
            Some((head, timestamp, old_remove)) => {
                if timestamp > max_timestamp {
                    RemoveAttempt::TooYoung
                } else {
                    match self.try_remove_oldest(head, old_remove) {
                        Some(value) => RemoveAttempt::Removed(value),
                        None => RemoveAttempt::Contended,
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.peek().is_none()
    }
}

impl<T: Payload> Default for SpBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The result of one buffer's contribution to a multi-producer scan.
pub enum RemoveAttempt<T> {
    Empty,
    TooYoung,
    Removed(T),
    Contended,
}

/// The fixed-size set of per-producer buffers a TS structure scans over,
/// standing in for the original's raw `insert_`/`remove_`/
/// `emptiness_check_pointers_` arrays sized to `num_threads`. Indexed by a
/// producer id handed out at registration time.
pub struct EntryRing<T: Payload> {
    buffers: Vec<SpBuffer<T>>,
}

impl<T: Payload> EntryRing<T> {
    pub fn new(capacity: usize) -> Self {
        EntryRing {
            buffers: (0..capacity.max(1)).map(|_| SpBuffer::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn get(&self, producer_id: usize) -> &SpBuffer<T> {
        &self.buffers[producer_id % self.buffers.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpBuffer<T>> {
        self.buffers.iter()
    }
}

/// A node in a [`SpStackBuffer`]'s list. Unlike [`Item`], removal doesn't
/// advance a shared cursor — since producers prepend, a node anywhere in
/// the list may become the youngest live element once its neighbors are
/// taken, so each node carries its own tombstone instead.
struct StackItem<T> {
    next: AtomicPtr<StackItem<T>>,
    data: T,
    timestamp: AtomicU64,
    taken: AtomicBool,
}

/// The stack variant's single-producer buffer: inserts prepend at `head`, so
/// the head is always the most recently inserted, not-yet-removed element.
/// Grounded in `ts_stack_buffer.h::get_youngest_item`, which walks from the
/// head rather than advancing a forward cursor as the queue variant does.
///
/// Nodes are heap-allocated with `Box::into_raw` and never freed, as with
/// the rest of this crate's node types.
pub struct SpStackBuffer<T: Payload> {
    head: AtomicPtr<StackItem<T>>,
}

impl<T: Payload> SpStackBuffer<T> {
    pub fn new() -> Self {
        SpStackBuffer {
            head: AtomicPtr::new(std::ptr::null_mut()),
        }
    }

    /// Prepends `item` stamped with `timestamp` as the new head. Only the
    /// owning producer thread may call this.
    pub fn insert(&self, item: T, timestamp: u64) {
        let old_head = self.head.load(Ordering::Relaxed);
        let node = Box::into_raw(Box::new(StackItem {
            next: AtomicPtr::new(old_head),
            data: item,
            timestamp: AtomicU64::new(timestamp),
            taken: AtomicBool::new(false),
        }));
        self.head.store(node, Ordering::Release);
    }

    /// Walks from `head` (youngest) toward the tail (oldest), returning the
    /// first not-yet-taken node's pointer and timestamp.
    fn peek_youngest(&self) -> Option<(*mut StackItem<T>, u64)> {
        let mut node = self.head.load(Ordering::Acquire);
        while !node.is_null() {
            let item = unsafe { &*node };
            if !item.taken.load(Ordering::Acquire) {
                return Some((node, item.timestamp.load(Ordering::Acquire)));
            }
            node = item.next.load(Ordering::Acquire);
        }
        None
    }

    /// The timestamp of the youngest unremoved element, for callers that
    /// only need to compare ages across producers before committing to a
    /// removal.
    pub fn youngest_timestamp(&self) -> Option<u64> {
        self.peek_youngest().map(|(_, ts)| ts)
    }

    /// Claims the youngest unremoved element if it's no younger than
    /// `max_timestamp`, via a CAS on its tombstone so concurrent consumers
    /// racing for the same node can't both take it.
    pub fn take_youngest_if(&self, max_timestamp: u64) -> RemoveAttempt<T> {
        match self.peek_youngest() {
            None => RemoveAttempt::Empty,
            Some((node, timestamp)) => {
                if timestamp > max_timestamp {
                    RemoveAttempt::TooYoung
                } else {
                    let item = unsafe { &*node };
                    if item
                        .taken
                        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                        .is_ok()
                    {
                        RemoveAttempt::Removed(item.data)
                    } else {
                        RemoveAttempt::Contended
                    }
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.peek_youngest().is_none()
    }
}

impl<T: Payload> Default for SpStackBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The stack variant's per-producer buffer set, mirroring [`EntryRing`].
pub struct StackEntryRing<T: Payload> {
    buffers: Vec<SpStackBuffer<T>>,
}

impl<T: Payload> StackEntryRing<T> {
    pub fn new(capacity: usize) -> Self {
        StackEntryRing {
            buffers: (0..capacity.max(1)).map(|_| SpStackBuffer::new()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    pub fn get(&self, producer_id: usize) -> &SpStackBuffer<T> {
        &self.buffers[producer_id % self.buffers.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpStackBuffer<T>> {
        self.buffers.iter()
    }
}
