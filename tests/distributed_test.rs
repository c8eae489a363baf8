mod common;

use common::recording::RecordingChannel;
use common::severed::SeveredChannel;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rowblock_matmul::channel::{broadcast_matrix, Channel, LocalWorld};
use rowblock_matmul::{ChannelError, DistributedMultiplier, Matrix, MultiplyError};

fn small_pair() -> (Matrix<i32>, Matrix<i32>) {
    let a = Matrix::from_rows(vec![vec![1, 2], vec![3, 4]]).unwrap();
    let b = Matrix::from_rows(vec![vec![5, 6], vec![7, 8]]).unwrap();
    (a, b)
}

#[test]
fn test_known_product_with_one_and_two_workers() {
    let (a, b) = small_pair();
    let expected = Matrix::from_rows(vec![vec![19, 22], vec![43, 50]]).unwrap();

    for active in [1, 2] {
        let results = LocalWorld::run(2, |channel| {
            let mut engine = DistributedMultiplier::new(channel);
            engine.multiply(&a, &b, active).unwrap()
        });

        assert_eq!(results[0].as_ref(), Some(&expected), "active = {}", active);
        assert!(results[1].is_none());
        assert_eq!(a.multiply(&b).unwrap(), expected);
    }
}

#[test]
fn test_result_is_independent_of_worker_count() {
    let mut rng = StdRng::seed_from_u64(2024);
    let a = Matrix::random(50, 30, -1000, 1000, &mut rng);
    let b = Matrix::random(30, 20, -1000, 1000, &mut rng);
    let reference = a.multiply(&b).unwrap();

    for active in [1, 2, 4, 8] {
        let results = LocalWorld::run(8, |channel| {
            let mut engine = DistributedMultiplier::new(channel);
            engine.multiply(&a, &b, active).unwrap()
        });

        let result = results[0].as_ref().expect("coordinator returns the product");
        assert_eq!(result.rows(), 50);
        assert_eq!(result.cols(), 20);
        assert_eq!(result, &reference, "active = {}", active);
        assert!(results[1..].iter().all(Option::is_none));
    }
}

#[test]
fn test_float_product_is_bit_identical_across_worker_counts() {
    let mut rng = StdRng::seed_from_u64(99);
    let a = Matrix::random(17, 9, -1.0f64, 1.0, &mut rng);
    let b = Matrix::random(9, 5, -1.0f64, 1.0, &mut rng);

    let products: Vec<Vec<u64>> = [1, 3, 4]
        .into_iter()
        .map(|active| {
            let results = LocalWorld::run(4, |channel| {
                DistributedMultiplier::new(channel).multiply(&a, &b, active).unwrap()
            });
            let result = results.into_iter().next().flatten().unwrap();
            result.as_slice().iter().map(|v| v.to_bits()).collect()
        })
        .collect();

    assert_eq!(products[0], products[1]);
    assert_eq!(products[0], products[2]);
}

#[test]
fn test_dimension_mismatch_fails_everywhere_without_traffic() {
    let a = Matrix::<i32>::new(3, 4);
    let b = Matrix::<i32>::new(5, 6);

    let outcomes = LocalWorld::run(3, |channel| {
        let recording = RecordingChannel::new(channel);
        let outcome = DistributedMultiplier::new(&recording).multiply(&a, &b, 3);
        (outcome, recording.traffic())
    });

    for (outcome, traffic) in outcomes {
        assert!(matches!(
            outcome,
            Err(MultiplyError::DimensionMismatch {
                left_rows: 3,
                left_cols: 4,
                right_rows: 5,
                right_cols: 6,
            })
        ));
        assert_eq!(traffic, 0);
    }
}

#[test]
fn test_invalid_active_worker_count_is_rejected() {
    let (a, b) = small_pair();

    for active in [0, 3] {
        let outcomes = LocalWorld::run(2, |channel| {
            let recording = RecordingChannel::new(channel);
            let outcome = DistributedMultiplier::new(&recording).multiply(&a, &b, active);
            (outcome, recording.traffic())
        });

        for (outcome, traffic) in outcomes {
            assert!(
                matches!(outcome, Err(MultiplyError::Configuration { active: rejected, world_size: 2 }) if rejected == active),
                "active = {}",
                active
            );
            assert_eq!(traffic, 0);
        }
    }
}

#[test]
fn test_more_workers_than_rows() {
    let a = Matrix::from_rows(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
    let b = Matrix::from_rows(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
    let expected = a.multiply(&b).unwrap();

    let outcomes = LocalWorld::run(5, |channel| {
        let recording = RecordingChannel::new(channel);
        let result = DistributedMultiplier::new(&recording).multiply(&a, &b, 5).unwrap();
        (result, recording.sends(), recording.receives())
    });

    let (result, _, receives) = &outcomes[0];
    assert_eq!(result.as_ref(), Some(&expected));
    // Only rank 1 owns a row besides the coordinator.
    assert_eq!(*receives, 1);
    assert_eq!(outcomes[1].1, 1);
    for (result, sends, _) in &outcomes[2..] {
        assert!(result.is_none());
        assert_eq!(*sends, 0);
    }
}

#[test]
fn test_inactive_ranks_return_immediately() {
    let (a, b) = small_pair();

    let outcomes = LocalWorld::run(4, |channel| {
        let recording = RecordingChannel::new(channel);
        let result = DistributedMultiplier::new(&recording).multiply(&a, &b, 2).unwrap();
        (result.is_some(), recording.traffic())
    });

    assert_eq!(outcomes[0], (true, 1));
    assert_eq!(outcomes[1], (false, 1));
    assert_eq!(outcomes[2], (false, 0));
    assert_eq!(outcomes[3], (false, 0));
}

#[test]
fn test_repeated_calls_reuse_engine() {
    let (a, b) = small_pair();
    let expected = a.multiply(&b).unwrap();

    let results = LocalWorld::run(3, |channel| {
        let mut engine = DistributedMultiplier::new(channel);
        let mut products = Vec::new();
        for active in [3, 1, 2, 3] {
            products.push(engine.multiply(&a, &b, active).unwrap());
        }
        products
    });

    for product in &results[0] {
        assert_eq!(product.as_ref(), Some(&expected));
    }
}

#[test]
fn test_broadcast_then_multiply() {
    let results = LocalWorld::run(3, |channel| {
        let (mut a, mut b) = if channel.rank() == 0 {
            small_pair()
        } else {
            (Matrix::new(0, 0), Matrix::new(0, 0))
        };
        broadcast_matrix(&channel, &mut a, 0).unwrap();
        broadcast_matrix(&channel, &mut b, 0).unwrap();
        assert_eq!((a.rows(), a.cols()), (2, 2));

        DistributedMultiplier::new(channel).multiply(&a, &b, 3).unwrap()
    });

    let expected = Matrix::from_rows(vec![vec![19, 22], vec![43, 50]]).unwrap();
    assert_eq!(results[0].as_ref(), Some(&expected));
}

#[test]
fn test_lost_worker_fails_the_gather() {
    let mut rng = StdRng::seed_from_u64(9);
    let a = Matrix::random(7, 4, -10, 10, &mut rng);
    let b = Matrix::random(4, 3, -10, 10, &mut rng);

    let outcomes = LocalWorld::run(3, |channel| {
        let severed = SeveredChannel::new(channel, 2);
        DistributedMultiplier::new(&severed).multiply(&a, &b, 3)
    });

    assert!(matches!(
        outcomes[0],
        Err(MultiplyError::Communication(ChannelError::Disconnected(2)))
    ));
    assert!(matches!(outcomes[1], Ok(None)));
    assert!(matches!(
        outcomes[2],
        Err(MultiplyError::Communication(ChannelError::Disconnected(0)))
    ));
}
