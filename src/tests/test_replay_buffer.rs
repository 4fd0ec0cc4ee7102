use ndarray::array;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::error::DqnError;
use crate::replay_buffer::{ReplayBuffer, Transition};

fn numbered(i: usize) -> Transition {
    Transition::new(array![i as f32], i, array![(i + 1) as f32], i as f32, i % 2 == 0)
}

#[test]
fn test_replay_buffer_push_and_len() {
    let mut buffer = ReplayBuffer::new(10).unwrap();
    assert!(buffer.is_empty());
    buffer.push(numbered(0));
    buffer.push(numbered(1));
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.capacity(), 10);
    assert_eq!(buffer.write_index(), 2);
    assert_eq!(buffer.get(1), Some(&numbered(1)));
}

#[test]
fn test_replay_buffer_zero_capacity_rejected() {
    assert!(matches!(
        ReplayBuffer::new(0),
        Err(DqnError::InvalidConfiguration { .. })
    ));
}

#[test]
fn test_ring_overwrite_in_insertion_order() {
    let mut buffer = ReplayBuffer::new(3).unwrap();
    for i in 0..5 {
        buffer.push(numbered(i));
    }

    // Slots 0 and 1 were recycled for transitions 3 and 4.
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.write_index(), 2);
    let slots: Vec<usize> = buffer.iter().map(|t| t.action).collect();
    assert_eq!(slots, vec![3, 4, 2]);

    buffer.push(numbered(5));
    let slots: Vec<usize> = buffer.iter().map(|t| t.action).collect();
    assert_eq!(slots, vec![3, 4, 5]);
    assert_eq!(buffer.write_index(), 0);
}

#[test]
fn test_sample_rows_are_distinct_and_aligned() {
    let mut buffer = ReplayBuffer::new(16).unwrap();
    for i in 0..10 {
        buffer.push(numbered(i));
    }
    let mut rng = StdRng::seed_from_u64(5);
    let batch = buffer.sample(10, &mut rng).unwrap();

    assert_eq!(batch.len(), 10);
    assert_eq!(batch.states.dim(), (10, 1));
    assert_eq!(batch.next_states.dim(), (10, 1));
    assert_eq!(batch.rewards.len(), 10);
    assert_eq!(batch.dones.len(), 10);

    let mut seen = HashSet::new();
    for row in 0..batch.len() {
        let id = batch.actions[row];
        assert!(seen.insert(id), "transition {} sampled twice", id);
        assert_eq!(batch.states[[row, 0]], id as f32);
        assert_eq!(batch.next_states[[row, 0]], (id + 1) as f32);
        assert_eq!(batch.rewards[row], id as f32);
        assert_eq!(batch.dones[row], id % 2 == 0);
    }
    assert_eq!(seen.len(), 10);
}

#[test]
fn test_sample_smaller_batch() {
    let mut buffer = ReplayBuffer::new(8).unwrap();
    for i in 0..8 {
        buffer.push(numbered(i));
    }
    let batch = buffer.sample(3, &mut rand::thread_rng()).unwrap();
    assert_eq!(batch.len(), 3);
    let ids: HashSet<usize> = batch.actions.iter().copied().collect();
    assert_eq!(ids.len(), 3);
}

#[test]
fn test_sample_insufficient_samples() {
    let mut buffer = ReplayBuffer::new(8).unwrap();
    for i in 0..3 {
        buffer.push(numbered(i));
    }
    let result = buffer.sample(4, &mut rand::thread_rng());
    assert_eq!(
        result.unwrap_err(),
        DqnError::InsufficientSamples {
            requested: 4,
            available: 3
        }
    );
}

#[test]
fn test_sample_is_reproducible_with_seed() {
    let mut buffer = ReplayBuffer::new(50).unwrap();
    for i in 0..50 {
        buffer.push(numbered(i));
    }
    let a = buffer.sample(8, &mut StdRng::seed_from_u64(99)).unwrap();
    let b = buffer.sample(8, &mut StdRng::seed_from_u64(99)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_sample_rejects_ragged_states() {
    let mut buffer = ReplayBuffer::new(4).unwrap();
    buffer.push(Transition::new(array![0.0], 0, array![1.0], 0.0, false));
    buffer.push(Transition::new(array![0.0, 1.0], 0, array![1.0, 2.0], 0.0, false));
    let result = buffer.sample(2, &mut rand::thread_rng());
    assert!(matches!(result, Err(DqnError::DimensionMismatch { .. })));
}

#[test]
fn test_sample_zero_batch_rejected() {
    let mut buffer = ReplayBuffer::new(4).unwrap();
    buffer.push(numbered(0));
    let result = buffer.sample(0, &mut rand::thread_rng());
    assert!(matches!(result, Err(DqnError::InvalidConfiguration { .. })));
}
