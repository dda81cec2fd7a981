//! Keyed list rendering
//!
//! `Renderer::map` renders one row per list item and keeps rows alive across
//! passes by item identity, so a reordered list moves existing nodes instead
//! of recreating them. Rows live between two empty text markers owned by the
//! scope that inserted the list.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::mem;
use std::rc::Rc;

use fos_dom::NodeId;
use fos_reactive::{root, Dispose};

use crate::{report, Children, RenderResult, Renderer};

type RowCallback<T> = Rc<dyn Fn(&Renderer, &T, usize) -> Children>;

/// One rendered list item
struct Row<T> {
    item: T,
    index: usize,
    /// First node produced for the item
    begin: NodeId,
    /// Last node produced for the item (a marker when the tail is reactive)
    end: NodeId,
    dispose: Dispose,
    /// Pass that last claimed this row
    run_id: u64,
}

type RowRef<T> = Rc<RefCell<Row<T>>>;

struct MapState<T> {
    /// First row for each distinct item
    cache: HashMap<T, RowRef<T>>,
    /// Further rows for equal items, keyed by list index
    duplicates: HashMap<usize, RowRef<T>>,
    /// Rows in current list order
    rows: Vec<RowRef<T>>,
    run_id: u64,
}

impl<T> Default for MapState<T> {
    fn default() -> Self {
        Self {
            cache: HashMap::new(),
            duplicates: HashMap::new(),
            rows: Vec::new(),
            run_id: 0,
        }
    }
}

impl<T: Hash + Eq + Clone> MapState<T> {
    /// Row for `item` at `index` not yet claimed in pass `run_id`
    fn find(&self, item: &T, index: usize, run_id: u64) -> Option<RowRef<T>> {
        let unclaimed = |row: &&RowRef<T>| {
            let row = row.borrow();
            row.run_id != run_id && row.item == *item
        };
        if let Some(row) = self.cache.get(item).filter(unclaimed) {
            return Some(row.clone());
        }
        if let Some(row) = self.duplicates.get(&index).filter(unclaimed) {
            return Some(row.clone());
        }
        self.duplicates.values().find(unclaimed).cloned()
    }

    /// Rebuild both caches from the current rows
    fn reindex(&mut self) {
        self.cache.clear();
        self.duplicates.clear();
        for row in &self.rows {
            let (item, index) = {
                let row = row.borrow();
                (row.item.clone(), row.index)
            };
            if self.cache.contains_key(&item) {
                self.duplicates.insert(index, row.clone());
            } else {
                self.cache.insert(item, row.clone());
            }
        }
    }
}

struct KeyedList<T> {
    state: RefCell<MapState<T>>,
    callback: RowCallback<T>,
    begin: NodeId,
    end: NodeId,
    sort: bool,
}

impl<T: Hash + Eq + Clone + 'static> KeyedList<T> {
    fn reconcile(&self, renderer: &Renderer, items: Vec<T>) {
        let mut state = mem::take(&mut *self.state.borrow_mut());
        state.run_id += 1;
        let run_id = state.run_id;
        let prev = mem::take(&mut state.rows);

        if items.is_empty() {
            state.cache.clear();
            state.duplicates.clear();
            *self.state.borrow_mut() = state;
            tracing::trace!("keyed list emptied, disposing {} rows", prev.len());
            prev.iter().for_each(dispose_row);
            return;
        }

        let mut next = Vec::with_capacity(items.len());
        let mut created = Vec::new();
        for (index, item) in items.into_iter().enumerate() {
            let row = match state.find(&item, index, run_id) {
                Some(row) => {
                    {
                        let mut row = row.borrow_mut();
                        row.run_id = run_id;
                        row.index = index;
                    }
                    row
                }
                None => {
                    created.push(next.len());
                    self.create_row(renderer, item, index, run_id)
                }
            };
            next.push(row);
        }

        let stale: Vec<RowRef<T>> = prev
            .iter()
            .filter(|row| row.borrow().run_id != run_id)
            .cloned()
            .collect();
        state.rows = next.clone();
        state.reindex();
        *self.state.borrow_mut() = state;

        tracing::trace!(
            "keyed list pass {}: {} rows, {} created, {} disposed",
            run_id,
            next.len(),
            created.len(),
            stale.len()
        );
        stale.iter().for_each(dispose_row);

        let Some(parent) = renderer.tree().parent(self.end) else {
            tracing::debug!("keyed list end marker {:?} is detached", self.end);
            return;
        };
        if !self.sort || prev.is_empty() {
            for &i in &created {
                let (begin, end) = bounds(&next[i]);
                move_row(renderer, begin, end, parent, self.end);
            }
            return;
        }

        if self.splice_around_kept(renderer, parent, &prev, &next) {
            return;
        }
        self.reverse_scan(renderer, parent, &next);
    }

    /// Leave the longest run of rows that kept their relative order in
    /// place and splice every other row in front of its successor. Returns
    /// false when nothing was kept or the result is out of order.
    fn splice_around_kept(
        &self,
        renderer: &Renderer,
        parent: NodeId,
        prev: &[RowRef<T>],
        next: &[RowRef<T>],
    ) -> bool {
        let positions: HashMap<*const RefCell<Row<T>>, usize> = prev
            .iter()
            .enumerate()
            .map(|(i, row)| (Rc::as_ptr(row), i))
            .collect();
        let kept: Vec<(usize, usize)> = next
            .iter()
            .enumerate()
            .filter_map(|(i, row)| positions.get(&Rc::as_ptr(row)).map(|&p| (i, p)))
            .collect();
        let order: Vec<usize> = kept.iter().map(|&(_, p)| p).collect();
        let stable: HashSet<usize> = longest_increasing_subsequence(&order)
            .into_iter()
            .map(|k| kept[k].0)
            .collect();
        if stable.is_empty() {
            return false;
        }

        let mut anchor = self.end;
        for (i, row) in next.iter().enumerate().rev() {
            let (begin, end) = bounds(row);
            if !stable.contains(&i) {
                move_row(renderer, begin, end, parent, anchor);
            }
            anchor = begin;
        }

        if self.in_order(renderer, next) {
            true
        } else {
            tracing::debug!("keyed list splice left rows out of order, rescanning");
            false
        }
    }

    /// Walk rows from the end and move each one that is not directly in
    /// front of its successor
    fn reverse_scan(&self, renderer: &Renderer, parent: NodeId, next: &[RowRef<T>]) {
        let mut anchor = self.end;
        let mut moved = 0;
        for row in next.iter().rev() {
            let (begin, end) = bounds(row);
            let placed = {
                let tree = renderer.tree();
                tree.parent(end) == Some(parent) && tree.next_sibling(end) == Some(anchor)
            };
            if !placed {
                move_row(renderer, begin, end, parent, anchor);
                moved += 1;
            }
            anchor = begin;
        }
        tracing::trace!("keyed list reverse scan moved {} rows", moved);
    }

    fn in_order(&self, renderer: &Renderer, rows: &[RowRef<T>]) -> bool {
        let tree = renderer.tree();
        let mut prev = self.begin;
        for row in rows {
            let (begin, end) = bounds(row);
            if tree.next_sibling(prev) != Some(begin) {
                return false;
            }
            prev = end;
        }
        tree.next_sibling(prev) == Some(self.end)
    }

    /// Render one item in its own root. The nodes stay in a detached
    /// fragment until placement moves them into the list.
    fn create_row(&self, renderer: &Renderer, item: T, index: usize, run_id: u64) -> RowRef<T> {
        let callback = self.callback.clone();
        root(renderer.reactive(), |dispose| {
            let fragment = renderer.tree_mut().create_fragment();
            let children = callback(renderer, &item, index);
            let dynamic_tail = children.has_dynamic_tail();
            report(
                "keyed list row",
                renderer.insert_children(fragment, children, None).map(drop),
            );

            let nodes = renderer.tree().children(fragment);
            let (begin, end) = match (nodes.first(), nodes.last()) {
                (Some(&first), Some(&last)) if !dynamic_tail => (first, last),
                (first, _) => {
                    let marker = renderer.tree_mut().create_text("");
                    report("keyed list row", renderer.place(fragment, marker, None));
                    (first.copied().unwrap_or(marker), marker)
                }
            };

            Rc::new(RefCell::new(Row {
                item,
                index,
                begin,
                end,
                dispose,
                run_id,
            }))
        })
    }

    fn dispose_all(&self) {
        let rows = {
            let mut state = self.state.borrow_mut();
            state.cache.clear();
            state.duplicates.clear();
            mem::take(&mut state.rows)
        };
        tracing::trace!("keyed list owner disposed, disposing {} rows", rows.len());
        rows.iter().for_each(dispose_row);
    }
}

fn bounds<T>(row: &RowRef<T>) -> (NodeId, NodeId) {
    let row = row.borrow();
    (row.begin, row.end)
}

fn dispose_row<T>(row: &RowRef<T>) {
    let dispose = row.borrow().dispose.clone();
    dispose.dispose();
}

/// Move the nodes `begin..=end` in front of `anchor`
fn move_row(renderer: &Renderer, begin: NodeId, end: NodeId, parent: NodeId, anchor: NodeId) {
    let mut tree = renderer.tree_mut();
    let mut nodes = vec![begin];
    let mut cur = begin;
    while cur != end {
        match tree.next_sibling(cur) {
            Some(next) => {
                nodes.push(next);
                cur = next;
            }
            None => break,
        }
    }
    for node in nodes {
        if let Err(err) = tree.insert_before(parent, node, Some(anchor)) {
            tracing::warn!("moving keyed list row: {}", err);
            return;
        }
    }
}

/// Indexes of one longest strictly increasing subsequence of `seq`
pub(crate) fn longest_increasing_subsequence(seq: &[usize]) -> Vec<usize> {
    let mut tails: Vec<usize> = Vec::new();
    let mut links: Vec<Option<usize>> = vec![None; seq.len()];
    for (i, &value) in seq.iter().enumerate() {
        let pos = tails.partition_point(|&t| seq[t] < value);
        if pos > 0 {
            links[i] = Some(tails[pos - 1]);
        }
        if pos == tails.len() {
            tails.push(i);
        } else {
            tails[pos] = i;
        }
    }

    let mut out = Vec::with_capacity(tails.len());
    let mut cur = tails.last().copied();
    while let Some(i) = cur {
        out.push(i);
        cur = links[i];
    }
    out.reverse();
    out
}

impl Renderer {
    /// Keyed list: one row per item of `list`, reused across passes by
    /// item identity. With `sort`, existing rows are reordered to follow
    /// the list; without it, only new rows are appended.
    pub fn map<T>(
        &self,
        list: impl Fn() -> Vec<T> + 'static,
        callback: impl Fn(&Renderer, &T, usize) -> Children + 'static,
        sort: bool,
    ) -> Children
    where
        T: Hash + Eq + Clone + 'static,
    {
        let list: Rc<dyn Fn() -> Vec<T>> = Rc::new(list);
        let callback: RowCallback<T> = Rc::new(callback);
        Children::Mount(Rc::new(
            move |renderer: &Renderer,
                  parent: NodeId,
                  anchor: Option<NodeId>|
                  -> RenderResult<Vec<NodeId>> {
                let (begin, end) = {
                    let mut tree = renderer.tree_mut();
                    (tree.create_text(""), tree.create_text(""))
                };
                renderer.place(parent, begin, anchor)?;
                renderer.place(parent, end, anchor)?;

                let keyed = Rc::new(KeyedList {
                    state: RefCell::new(MapState::default()),
                    callback: callback.clone(),
                    begin,
                    end,
                    sort,
                });
                let owned = keyed.clone();
                renderer.on_cleanup(move |_| owned.dispose_all());

                let list = list.clone();
                renderer.render_effect(move |renderer| {
                    let items = list();
                    keyed.reconcile(renderer, items);
                });
                Ok(vec![begin, end])
            },
        ))
    }
}
