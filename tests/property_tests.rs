#[cfg(test)]
mod property_tests {
    use ndarray::{array, Array1, Array2};
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tdq::config::EpsilonSchedule;
    use tdq::loss::{Loss, MeanSquaredError};
    use tdq::network::{NeuralNetwork, QNetwork};
    use tdq::optimizer::GradientClipper;
    use tdq::replay_buffer::{ReplayBuffer, Transition};
    use tdq::trainer::{argmax, td_targets};

    fn numbered(i: usize) -> Transition {
        Transition::new(array![i as f32], i, array![i as f32], 0.0, false)
    }

    // Strategy for schedules with start >= end, both probabilities
    fn schedule_strategy() -> impl Strategy<Value = EpsilonSchedule> {
        (0.0f32..=1.0, 0.0f32..=1.0, 1usize..5000).prop_map(|(a, b, decay)| EpsilonSchedule {
            start: a.max(b),
            end: a.min(b),
            decay,
        })
    }

    proptest! {
        #[test]
        fn test_epsilon_is_non_increasing(schedule in schedule_strategy(), step in 0usize..10_000) {
            prop_assert!(schedule.threshold(step + 1) <= schedule.threshold(step));
        }

        #[test]
        fn test_epsilon_endpoints(schedule in schedule_strategy(), extra in 0usize..10_000) {
            prop_assert!((schedule.threshold(0) - schedule.start).abs() < 1e-6);
            prop_assert_eq!(schedule.threshold(schedule.decay + extra), schedule.end);
        }

        #[test]
        fn test_ring_keeps_most_recent(capacity in 1usize..64, pushes in 0usize..200) {
            let mut buffer = ReplayBuffer::new(capacity).unwrap();
            for i in 0..pushes {
                buffer.push(numbered(i));
            }

            let expected_len = pushes.min(capacity);
            prop_assert_eq!(buffer.len(), expected_len);
            prop_assert!(buffer.len() <= buffer.capacity());
            prop_assert_eq!(buffer.write_index(), pushes % capacity);

            let stored: HashSet<usize> = buffer.iter().map(|t| t.action).collect();
            let newest: HashSet<usize> = (pushes - expected_len..pushes).collect();
            prop_assert_eq!(stored, newest);
        }

        #[test]
        fn test_sample_without_replacement(
            capacity in 1usize..64,
            pushes in 1usize..128,
            seed in any::<u64>(),
        ) {
            let mut buffer = ReplayBuffer::new(capacity).unwrap();
            for i in 0..pushes {
                buffer.push(numbered(i));
            }
            let batch_size = 1 + (seed as usize) % buffer.len();
            let mut rng = StdRng::seed_from_u64(seed);
            let batch = buffer.sample(batch_size, &mut rng).unwrap();

            prop_assert_eq!(batch.len(), batch_size);
            prop_assert_eq!(batch.states.nrows(), batch_size);
            let ids: HashSet<usize> = batch.actions.iter().copied().collect();
            prop_assert_eq!(ids.len(), batch_size);
            for row in 0..batch_size {
                prop_assert_eq!(batch.states[[row, 0]], batch.actions[row] as f32);
            }
        }

        #[test]
        fn test_terminal_targets_ignore_bootstrap(
            rows in prop::collection::vec((-10.0f32..10.0, any::<bool>(), -100.0f32..100.0), 1..32),
            gamma in 0.0f32..=1.0,
        ) {
            let rewards: Array1<f32> = rows.iter().map(|r| r.0).collect();
            let dones: Vec<bool> = rows.iter().map(|r| r.1).collect();
            let bootstrap: Array1<f32> = rows.iter().map(|r| r.2).collect();
            let targets = td_targets(rewards.view(), &dones, bootstrap.view(), gamma).unwrap();

            for (i, &(reward, done, next)) in rows.iter().enumerate() {
                if done {
                    prop_assert_eq!(targets[i], reward);
                } else {
                    prop_assert_eq!(targets[i], reward + gamma * next);
                }
            }
        }

        #[test]
        fn test_argmax_picks_a_maximum(values in prop::collection::vec(-1000.0f32..1000.0, 1..20)) {
            let values = Array1::from_vec(values);
            let best = argmax(values.view()).unwrap();
            prop_assert!(values.iter().all(|&v| v <= values[best]));
            prop_assert!(values.iter().take(best).all(|&v| v < values[best]));
        }

        #[test]
        fn test_clipped_gradients_stay_in_bounds(
            values in prop::collection::vec(-1e4f32..1e4, 1..64),
            bound in 0.001f32..10.0,
        ) {
            let mut grads = vec![Array1::from_vec(values.clone()).into_dyn()];
            GradientClipper::symmetric(bound).clip(&mut grads);
            for (&clipped, &raw) in grads[0].iter().zip(values.iter()) {
                prop_assert!(clipped.abs() <= bound);
                if raw.abs() <= bound {
                    prop_assert_eq!(clipped, raw);
                }
            }
        }

        #[test]
        fn test_mse_is_non_negative(
            pairs in prop::collection::vec((-100.0f32..100.0, -100.0f32..100.0), 1..32),
        ) {
            let predictions: Array1<f32> = pairs.iter().map(|p| p.0).collect();
            let targets: Array1<f32> = pairs.iter().map(|p| p.1).collect();
            let loss = MeanSquaredError.compute(predictions.view(), targets.view()).unwrap();
            prop_assert!(loss >= 0.0);
            prop_assert!(loss.is_finite());
        }

        #[test]
        fn test_forward_batch_shape(sizes in prop::collection::vec(1usize..16, 2..5), batch in 1usize..8) {
            let network = NeuralNetwork::q_network(&sizes).unwrap();
            let output = network.forward_batch(Array2::zeros((batch, sizes[0])).view()).unwrap();
            prop_assert_eq!(output.dim(), (batch, *sizes.last().unwrap()));
        }
    }
}
