#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::SolveError;
use crate::homography::{PerspectiveSolution, Solver};
use crate::point::Point2;

/// A source/destination corner pair.
pub type CornerPair = ([Point2; 4], [Point2; 4]);

/// Solve many independent corner pairs. Results keep the input order.
///
/// Each solve is a pure function of its inputs, so with the `parallel`
/// feature the pairs are spread over the rayon thread pool without any
/// shared state.
pub fn solve_batch(
    solver: &Solver,
    pairs: &[CornerPair],
) -> Vec<Result<PerspectiveSolution, SolveError>> {
    #[cfg(feature = "parallel")]
    {
        pairs
            .par_iter()
            .map(|(from, to)| solver.solve(from, to))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        pairs
            .iter()
            .map(|(from, to)| solver.solve(from, to))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(offset: f64, size: f64) -> [Point2; 4] {
        [
            Point2::new(offset, offset),
            Point2::new(offset + size, offset),
            Point2::new(offset + size, offset + size),
            Point2::new(offset, offset + size),
        ]
    }

    #[test]
    fn batch_matches_individual_solves_in_order() {
        let solver = Solver::default();
        let pairs: Vec<CornerPair> = (1..=16)
            .map(|i| (square(0.0, 1.0), square(i as f64, 1.0 + i as f64 * 0.5)))
            .collect();
        let results = solve_batch(&solver, &pairs);
        assert_eq!(results.len(), pairs.len());
        for ((from, to), result) in pairs.iter().zip(&results) {
            let expected = solver.solve(from, to).unwrap();
            assert_eq!(result.as_ref().unwrap(), &expected);
        }
    }

    #[test]
    fn failures_stay_in_place() {
        let solver = Solver::default();
        let line = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(3.0, 0.0),
        ];
        let pairs = vec![
            (square(0.0, 1.0), square(2.0, 3.0)),
            (square(0.0, 1.0), line),
            (square(0.0, 1.0), square(1.0, 1.0)),
        ];
        let results = solve_batch(&solver, &pairs);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(results[2].is_ok());
    }
}
