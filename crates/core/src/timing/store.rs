//! In-memory activity collection with selection state

use chrono::{DateTime, Duration, Utc};
use idletally_domain::{Activity, ActivityKey, SegmentKey, TimeSegment};

/// Index value meaning "nothing selected"
pub const NO_SELECTION: i64 = -1;

/// A time segment held by the store, tagged with its session key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSegment {
    pub key: SegmentKey,
    pub segment: TimeSegment,
}

/// An activity held by the store, tagged with its session key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredActivity {
    pub key: ActivityKey,
    pub id: Option<i64>,
    pub name: String,
    pub segments: Vec<StoredSegment>,
}

impl StoredActivity {
    /// Detached copy suitable for handing to a repository
    pub fn to_activity(&self) -> Activity {
        Activity {
            id: self.id,
            name: self.name.clone(),
            time_segments: self.segments.iter().map(|stored| stored.segment.clone()).collect(),
        }
    }

    pub fn segment(&self, key: SegmentKey) -> Option<&StoredSegment> {
        self.segments.iter().find(|stored| stored.key == key)
    }

    pub fn segment_position(&self, key: SegmentKey) -> Option<usize> {
        self.segments.iter().position(|stored| stored.key == key)
    }

    /// Segment at a selection index, `None` when out of range
    pub fn segment_at(&self, index: i64) -> Option<&StoredSegment> {
        position_in(index, self.segments.len()).map(|position| &self.segments[position])
    }

    pub fn total_elapsed(&self, now: DateTime<Utc>) -> Duration {
        self.segments.iter().fold(Duration::zero(), |acc, stored| acc + stored.segment.elapsed(now))
    }

    /// Adopt a saved copy produced by [`Self::to_activity`]
    ///
    /// Segments are matched by position, which `to_activity` preserves.
    pub(crate) fn apply_saved(&mut self, saved: Activity) {
        self.id = saved.id;
        self.name = saved.name;
        for (stored, segment) in self.segments.iter_mut().zip(saved.time_segments) {
            stored.segment = segment;
        }
    }
}

/// Ordered activities plus the selected activity and segment indices
#[derive(Debug)]
pub struct ActivityStore {
    activities: Vec<StoredActivity>,
    next_key: u64,
    selected_activity_index: i64,
    selected_time_segment_index: i64,
}

impl Default for ActivityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityStore {
    pub const fn new() -> Self {
        Self {
            activities: Vec::new(),
            next_key: 1,
            selected_activity_index: NO_SELECTION,
            selected_time_segment_index: NO_SELECTION,
        }
    }

    pub fn activities(&self) -> &[StoredActivity] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn activity(&self, key: ActivityKey) -> Option<&StoredActivity> {
        self.activities.iter().find(|stored| stored.key == key)
    }

    pub(crate) fn activity_mut(&mut self, key: ActivityKey) -> Option<&mut StoredActivity> {
        self.activities.iter_mut().find(|stored| stored.key == key)
    }

    pub fn activity_position(&self, key: ActivityKey) -> Option<usize> {
        self.activities.iter().position(|stored| stored.key == key)
    }

    pub fn segment(&self, activity: ActivityKey, segment: SegmentKey) -> Option<&StoredSegment> {
        self.activity(activity).and_then(|stored| stored.segment(segment))
    }

    pub(crate) fn segment_mut(
        &mut self,
        activity: ActivityKey,
        segment: SegmentKey,
    ) -> Option<&mut TimeSegment> {
        self.activity_mut(activity)?
            .segments
            .iter_mut()
            .find(|stored| stored.key == segment)
            .map(|stored| &mut stored.segment)
    }

    // Selection

    pub const fn selected_activity_index(&self) -> i64 {
        self.selected_activity_index
    }

    pub fn set_selected_activity_index(&mut self, index: i64) {
        self.selected_activity_index = index;
    }

    pub const fn selected_time_segment_index(&self) -> i64 {
        self.selected_time_segment_index
    }

    pub fn set_selected_time_segment_index(&mut self, index: i64) {
        self.selected_time_segment_index = index;
    }

    pub fn selected_activity(&self) -> Option<&StoredActivity> {
        position_in(self.selected_activity_index, self.activities.len())
            .map(|position| &self.activities[position])
    }

    /// Selected segment of the selected activity
    pub fn selected_segment(&self) -> Option<&StoredSegment> {
        self.selected_activity()?.segment_at(self.selected_time_segment_index)
    }

    pub fn selected_keys(&self) -> Option<(ActivityKey, SegmentKey)> {
        let activity = self.selected_activity()?;
        let segment = activity.segment_at(self.selected_time_segment_index)?;
        Some((activity.key, segment.key))
    }

    // Mutation

    /// Append an activity and return its key and position
    pub fn push_activity(&mut self, activity: Activity) -> (ActivityKey, usize) {
        let stored = self.adopt(activity);
        let key = stored.key;
        self.activities.push(stored);
        (key, self.activities.len() - 1)
    }

    /// Append a segment to an activity and return its key and position
    pub fn push_segment(
        &mut self,
        activity: ActivityKey,
        segment: TimeSegment,
    ) -> Option<(SegmentKey, usize)> {
        let key = SegmentKey(self.allocate_key());
        let stored = self.activity_mut(activity)?;
        stored.segments.push(StoredSegment { key, segment });
        Some((key, stored.segments.len() - 1))
    }

    pub fn remove_activity(&mut self, key: ActivityKey) -> Option<StoredActivity> {
        let position = self.activity_position(key)?;
        Some(self.activities.remove(position))
    }

    pub fn remove_segment(
        &mut self,
        activity: ActivityKey,
        segment: SegmentKey,
    ) -> Option<StoredSegment> {
        let stored = self.activity_mut(activity)?;
        let position = stored.segment_position(segment)?;
        Some(stored.segments.remove(position))
    }

    /// Swap the whole collection and clear the selection
    pub fn replace_all(&mut self, activities: Vec<Activity>) {
        let adopted: Vec<StoredActivity> =
            activities.into_iter().map(|activity| self.adopt(activity)).collect();
        self.activities = adopted;
        self.selected_activity_index = NO_SELECTION;
        self.selected_time_segment_index = NO_SELECTION;
    }

    /// Swap an activity's segments, keeping the segment `keep` appended last
    pub fn replace_segments(
        &mut self,
        activity: ActivityKey,
        segments: Vec<TimeSegment>,
        keep: Option<SegmentKey>,
    ) -> bool {
        let fresh: Vec<StoredSegment> = segments
            .into_iter()
            .map(|segment| StoredSegment { key: SegmentKey(self.allocate_key()), segment })
            .collect();
        let Some(stored) = self.activity_mut(activity) else {
            return false;
        };
        let kept = keep.and_then(|key| {
            let position = stored.segment_position(key)?;
            Some(stored.segments.remove(position))
        });
        stored.segments = fresh;
        stored.segments.extend(kept);
        true
    }

    /// Number of segments flagged open across the whole collection
    pub fn open_segment_count(&self) -> usize {
        self.activities
            .iter()
            .flat_map(|stored| stored.segments.iter())
            .filter(|stored| stored.segment.is_open)
            .count()
    }

    fn adopt(&mut self, activity: Activity) -> StoredActivity {
        let key = ActivityKey(self.allocate_key());
        let segments = activity
            .time_segments
            .into_iter()
            .map(|segment| StoredSegment { key: SegmentKey(self.allocate_key()), segment })
            .collect();
        StoredActivity { key, id: activity.id, name: activity.name, segments }
    }

    fn allocate_key(&mut self) -> u64 {
        let key = self.next_key;
        self.next_key += 1;
        key
    }
}

/// Position for a selection index, `None` outside `[0, len)`
pub fn position_in(index: i64, len: usize) -> Option<usize> {
    usize::try_from(index).ok().filter(|position| *position < len)
}

/// Selection index for a position
pub fn index_of(position: usize) -> i64 {
    i64::try_from(position).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 1, hour, min, 0).unwrap()
    }

    fn activity_with_segments(name: &str, count: usize) -> Activity {
        let mut activity = Activity::new(name);
        for i in 0..count {
            let start = at(9 + u32::try_from(i).unwrap(), 0);
            activity.time_segments.push(TimeSegment::closed(start, start + Duration::minutes(30)));
        }
        activity
    }

    #[test]
    fn test_new_store_has_no_selection() {
        let store = ActivityStore::new();
        assert!(store.is_empty());
        assert_eq!(store.selected_activity_index(), NO_SELECTION);
        assert!(store.selected_activity().is_none());
        assert!(store.selected_segment().is_none());
    }

    #[test]
    fn test_out_of_range_indices_read_as_none() {
        let mut store = ActivityStore::new();
        store.push_activity(activity_with_segments("A", 2));

        for index in [-2, -1, 1, 7] {
            store.set_selected_activity_index(index);
            assert!(store.selected_activity().is_none(), "index {index}");
        }

        store.set_selected_activity_index(0);
        store.set_selected_time_segment_index(2);
        assert!(store.selected_segment().is_none());
        store.set_selected_time_segment_index(1);
        assert!(store.selected_segment().is_some());
    }

    #[test]
    fn test_segment_selection_requires_activity_selection() {
        let mut store = ActivityStore::new();
        store.push_activity(activity_with_segments("A", 2));
        store.set_selected_time_segment_index(0);
        assert!(store.selected_segment().is_none());
        assert!(store.selected_keys().is_none());
    }

    #[test]
    fn test_keys_survive_removal_of_other_entries() {
        let mut store = ActivityStore::new();
        let (first, _) = store.push_activity(activity_with_segments("A", 1));
        let (second, _) = store.push_activity(activity_with_segments("B", 1));

        store.remove_activity(first);

        assert_eq!(store.activity_position(second), Some(0));
        assert_eq!(store.activity(second).map(|a| a.name.as_str()), Some("B"));
        assert!(store.activity(first).is_none());
    }

    #[test]
    fn test_replace_segments_keeps_requested_segment_last() {
        let mut store = ActivityStore::new();
        let (key, _) = store.push_activity(Activity::new("A"));
        let (open_key, _) = store.push_segment(key, TimeSegment::open_at(at(12, 0))).unwrap();

        let replaced = store.replace_segments(key, activity_with_segments("x", 2).time_segments, Some(open_key));

        assert!(replaced);
        let stored = store.activity(key).unwrap();
        assert_eq!(stored.segments.len(), 3);
        assert_eq!(stored.segments[2].key, open_key);
        assert_eq!(store.open_segment_count(), 1);
    }

    #[test]
    fn test_apply_saved_adopts_ids() {
        let mut store = ActivityStore::new();
        let (key, _) = store.push_activity(activity_with_segments("A", 2));

        let mut saved = store.activity(key).unwrap().to_activity();
        saved.id = Some(10);
        saved.time_segments[0].id = Some(100);
        saved.time_segments[1].id = Some(101);
        store.activity_mut(key).unwrap().apply_saved(saved);

        let stored = store.activity(key).unwrap();
        assert_eq!(stored.id, Some(10));
        assert_eq!(stored.segments[1].segment.id, Some(101));
    }

    #[test]
    fn test_replace_all_resets_selection() {
        let mut store = ActivityStore::new();
        store.push_activity(Activity::new("old"));
        store.set_selected_activity_index(0);

        store.replace_all(vec![Activity::new("a"), Activity::new("b")]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.selected_activity_index(), NO_SELECTION);
        assert_eq!(store.selected_time_segment_index(), NO_SELECTION);
    }

    #[test]
    fn test_total_elapsed() {
        let mut store = ActivityStore::new();
        let (key, _) = store.push_activity(activity_with_segments("A", 2));
        assert_eq!(store.activity(key).unwrap().total_elapsed(at(23, 0)), Duration::hours(1));
    }
}
