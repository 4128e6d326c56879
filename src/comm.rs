//! Communicator groups and their collectives.
//!
//! Every inter-rank exchange of the library goes through a [`Communicator`]:
//! broadcast, reduce, all-reduce, all-gather, paired send-recv, and the
//! color/key `split` that carves sub-communicators out of a group. The
//! transport is in-process: a world of `n` ranks runs as `n` threads sharing
//! a round-based rendezvous, so a full process grid fits inside one test
//! binary. Collectives on one communicator must be issued in the same order
//! on every member; ordering across communicators is never assumed.

use std::any::Any;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;

type Payload = Arc<dyn Any + Send + Sync>;

struct RoundResult {
    slots: Arc<Vec<Payload>>,
    pending: usize,
}

struct CollState {
    /// Round currently collecting contributions
    open: u64,
    arrived: usize,
    slots: Vec<Option<Payload>>,
    done: HashMap<u64, RoundResult>,
}

struct Shared {
    size: usize,
    coll: Mutex<CollState>,
    coll_cv: Condvar,
    mail: Mutex<HashMap<(usize, usize, u64), Payload>>,
    mail_cv: Condvar,
}

impl Shared {
    fn new(size: usize) -> Self {
        Shared {
            size,
            coll: Mutex::new(CollState {
                open: 0,
                arrived: 0,
                slots: (0..size).map(|_| None).collect(),
                done: HashMap::new(),
            }),
            coll_cv: Condvar::new(),
            mail: Mutex::new(HashMap::new()),
            mail_cv: Condvar::new(),
        }
    }
}

/// One rank's handle onto a communicator group.
pub struct Communicator {
    shared: Arc<Shared>,
    rank: usize,
    seq: Cell<u64>,
}

fn cast<T: Clone + 'static>(payload: &Payload) -> T {
    payload
        .downcast_ref::<T>()
        .expect("collective payload type mismatch")
        .clone()
}

impl Communicator {
    pub fn size(&self) -> usize {
        self.shared.size
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Rendezvous of one collective round: every member deposits a payload
    /// and receives the payloads of all members, indexed by rank.
    fn exchange(&self, payload: Payload) -> Arc<Vec<Payload>> {
        let round = self.seq.get();
        self.seq.set(round + 1);
        let shared = &*self.shared;
        let mut st = shared.coll.lock().expect("communicator poisoned");
        while st.open != round {
            st = shared.coll_cv.wait(st).expect("communicator poisoned");
        }
        st.slots[self.rank] = Some(payload);
        st.arrived += 1;
        if st.arrived == shared.size {
            let slots: Vec<Payload> = st.slots.iter_mut().map(|s| s.take().unwrap()).collect();
            st.arrived = 0;
            st.done.insert(
                round,
                RoundResult {
                    slots: Arc::new(slots),
                    pending: shared.size,
                },
            );
            st.open += 1;
            shared.coll_cv.notify_all();
        } else {
            while !st.done.contains_key(&round) {
                st = shared.coll_cv.wait(st).expect("communicator poisoned");
            }
        }
        let res = st.done.get_mut(&round).unwrap();
        let out = res.slots.clone();
        res.pending -= 1;
        if res.pending == 0 {
            st.done.remove(&round);
        }
        out
    }

    /// Broadcast the root's buffer into every member's buffer.
    pub fn bcast<T: Clone + Send + Sync + 'static>(&self, root: usize, buf: &mut [T]) {
        let payload: Payload = if self.rank == root {
            Arc::new(buf.to_vec())
        } else {
            Arc::new(())
        };
        let slots = self.exchange(payload);
        if self.rank != root {
            let data = slots[root]
                .downcast_ref::<Vec<T>>()
                .expect("collective payload type mismatch");
            assert_eq!(data.len(), buf.len(), "bcast length mismatch");
            buf.clone_from_slice(data);
        }
    }

    /// Broadcast an arbitrary value; the root passes `Some`.
    pub fn bcast_obj<T: Clone + Send + Sync + 'static>(&self, root: usize, value: Option<T>) -> T {
        let payload: Payload = match value {
            Some(v) => Arc::new(v),
            None => Arc::new(()),
        };
        let slots = self.exchange(payload);
        cast::<T>(&slots[root])
    }

    /// Element-wise sum over all members, result everywhere. Contributions
    /// are folded in rank order on every member, so the result is
    /// bit-identical across the group.
    pub fn allreduce_sum<T>(&self, buf: &mut [T])
    where
        T: Copy + std::ops::AddAssign + Send + Sync + 'static,
    {
        let slots = self.exchange(Arc::new(buf.to_vec()));
        for (r, slot) in slots.iter().enumerate() {
            let data = slot
                .downcast_ref::<Vec<T>>()
                .expect("collective payload type mismatch");
            assert_eq!(data.len(), buf.len(), "allreduce length mismatch");
            if r == 0 {
                buf.copy_from_slice(data);
            } else {
                for (dst, src) in buf.iter_mut().zip(data.iter()) {
                    *dst += *src;
                }
            }
        }
    }

    /// Element-wise sum landing on `root` only; other buffers are untouched.
    pub fn reduce_sum<T>(&self, root: usize, buf: &mut [T])
    where
        T: Copy + std::ops::AddAssign + Send + Sync + 'static,
    {
        let slots = self.exchange(Arc::new(buf.to_vec()));
        if self.rank == root {
            for (r, slot) in slots.iter().enumerate() {
                let data = slot
                    .downcast_ref::<Vec<T>>()
                    .expect("collective payload type mismatch");
                assert_eq!(data.len(), buf.len(), "reduce length mismatch");
                if r == 0 {
                    buf.copy_from_slice(data);
                } else {
                    for (dst, src) in buf.iter_mut().zip(data.iter()) {
                        *dst += *src;
                    }
                }
            }
        }
    }

    /// Gather one value per member, in rank order, on every member.
    pub fn allgather<T: Clone + Send + Sync + 'static>(&self, value: &T) -> Vec<T> {
        let slots = self.exchange(Arc::new(value.clone()));
        slots.iter().map(cast::<T>).collect()
    }

    pub fn barrier(&self) {
        self.exchange(Arc::new(()));
    }

    /// Paired exchange with `partner` under a matched `tag`. Both sides send
    /// and receive; with `partner == rank` this degenerates to a local copy.
    pub fn sendrecv<T: Clone + Send + Sync + 'static>(
        &self,
        partner: usize,
        tag: u64,
        value: &T,
    ) -> T {
        if partner == self.rank {
            return value.clone();
        }
        let shared = &*self.shared;
        {
            let key = (self.rank, partner, tag);
            let mut mail = shared.mail.lock().expect("communicator poisoned");
            while mail.contains_key(&key) {
                mail = shared.mail_cv.wait(mail).expect("communicator poisoned");
            }
            mail.insert(key, Arc::new(value.clone()));
            shared.mail_cv.notify_all();
        }
        let key = (partner, self.rank, tag);
        let mut mail = shared.mail.lock().expect("communicator poisoned");
        loop {
            if let Some(payload) = mail.remove(&key) {
                shared.mail_cv.notify_all();
                return cast::<T>(&payload);
            }
            mail = shared.mail_cv.wait(mail).expect("communicator poisoned");
        }
    }

    /// MPI-style color/key split. Members sharing a color form a new group;
    /// ranks within it are assigned by (key, old rank) order.
    pub fn split(&self, color: usize, key: usize) -> Communicator {
        let pairs = self.allgather(&(color, key));
        let mut members: Vec<(usize, usize)> = pairs
            .iter()
            .enumerate()
            .filter(|(_, (c, _))| *c == color)
            .map(|(r, (_, k))| (*k, r))
            .collect();
        members.sort();
        let new_rank = members
            .iter()
            .position(|&(_, r)| r == self.rank)
            .expect("split member lost its own rank");
        let leader = members[0].1;
        let published: Option<(usize, Arc<Shared>)> = if self.rank == leader {
            Some((color, Arc::new(Shared::new(members.len()))))
        } else {
            None
        };
        let groups = self.allgather(&published);
        let shared = groups
            .iter()
            .flatten()
            .find(|(c, _)| *c == color)
            .expect("split group has no leader")
            .1
            .clone();
        Communicator {
            shared,
            rank: new_rank,
            seq: Cell::new(0),
        }
    }

    /// A fresh communicator over the same group.
    pub fn dup(&self) -> Communicator {
        self.split(0, self.rank)
    }
}

/// Handles for a fresh world of `size` ranks, one per future thread.
pub fn world(size: usize) -> Vec<Communicator> {
    let shared = Arc::new(Shared::new(size));
    (0..size)
        .map(|rank| Communicator {
            shared: shared.clone(),
            rank,
            seq: Cell::new(0),
        })
        .collect()
}

/// Run `f` on every rank of a fresh world, one thread per rank, and collect
/// the per-rank results in rank order.
pub fn run_world<F, R>(size: usize, f: F) -> Vec<R>
where
    F: Fn(Communicator) -> R + Send + Sync + 'static,
    R: Send + 'static,
{
    let f = Arc::new(f);
    let handles: Vec<_> = world(size)
        .into_iter()
        .enumerate()
        .map(|(rank, comm)| {
            let f = f.clone();
            thread::Builder::new()
                .name(format!("rank-{}", rank))
                .spawn(move || f(comm))
                .expect("failed to spawn rank thread")
        })
        .collect();
    handles
        .into_iter()
        .map(|h| h.join().expect("rank thread panicked"))
        .collect()
}
