//! Worker and thread counts to sweep.

/// 1, 2, 4, ... up to `world_size`, always ending with `world_size`.
pub fn worker_counts(world_size: usize) -> Vec<usize> {
    let mut counts = powers_of_two_up_to(world_size);
    if counts.last() != Some(&world_size) && world_size > 0 {
        counts.push(world_size);
    }
    counts
}

/// 1, 2, 4, ... not exceeding `max_threads`.
pub fn thread_counts(max_threads: usize) -> Vec<usize> {
    powers_of_two_up_to(max_threads)
}

fn powers_of_two_up_to(limit: usize) -> Vec<usize> {
    std::iter::successors(Some(1usize), |&n| n.checked_mul(2))
        .take_while(|&n| n <= limit)
        .collect()
}
