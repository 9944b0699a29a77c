use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Operands are drawn from this range
pub const OPERAND_RANGE: RangeInclusive<u32> = 1..=4;
/// Every generated problem evaluates into this range
pub const ANSWER_RANGE: RangeInclusive<u32> = 1..=4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Subtract => '-',
            Operator::Multiply => 'x',
            Operator::Divide => '/',
        }
    }
}

/// A small arithmetic problem such as `6 / 2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MathProblem {
    pub left: u32,
    pub operator: Operator,
    pub right: u32,
}

impl MathProblem {
    /// Exact integer answer, `None` when the problem has no such answer
    pub fn answer(&self) -> Option<u32> {
        match self.operator {
            Operator::Add => self.left.checked_add(self.right),
            Operator::Subtract => self.left.checked_sub(self.right),
            Operator::Multiply => self.left.checked_mul(self.right),
            Operator::Divide => {
                if self.right == 0 || self.left % self.right != 0 {
                    None
                } else {
                    Some(self.left / self.right)
                }
            }
        }
    }

    /// Sample one candidate problem; it may fall outside `ANSWER_RANGE`
    fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let operator = Operator::ALL[rng.gen_range(0..Operator::ALL.len())];
        let a = rng.gen_range(OPERAND_RANGE);
        let b = rng.gen_range(OPERAND_RANGE);

        match operator {
            Operator::Subtract if a < b => MathProblem {
                left: b,
                operator,
                right: a,
            },
            // dividend is built from the quotient so the division is exact
            Operator::Divide => MathProblem {
                left: a * b,
                operator,
                right: b,
            },
            _ => MathProblem {
                left: a,
                operator,
                right: b,
            },
        }
    }
}

impl fmt::Display for MathProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.operator.symbol(), self.right)
    }
}

/// Draw problems until one evaluates to an exact answer in `ANSWER_RANGE`
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> MathProblem {
    loop {
        let problem = MathProblem::sample(rng);
        if problem.answer().is_some_and(|answer| ANSWER_RANGE.contains(&answer)) {
            return problem;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_answer() {
        let p = |left, operator, right| MathProblem {
            left,
            operator,
            right,
        };
        assert_eq!(p(3, Operator::Add, 1).answer(), Some(4));
        assert_eq!(p(1, Operator::Subtract, 3).answer(), None);
        assert_eq!(p(2, Operator::Multiply, 2).answer(), Some(4));
        assert_eq!(p(12, Operator::Divide, 4).answer(), Some(3));
        assert_eq!(p(7, Operator::Divide, 2).answer(), None);
        assert_eq!(p(7, Operator::Divide, 0).answer(), None);
    }

    #[test]
    fn test_display() {
        let problem = MathProblem {
            left: 8,
            operator: Operator::Divide,
            right: 4,
        };
        assert_eq!(problem.to_string(), "8 / 4");
    }

    #[test]
    fn test_ten_thousand_problems_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10_000 {
            let problem = generate(&mut rng);
            let answer = problem.answer().expect("generated problem must be exact");
            assert!(ANSWER_RANGE.contains(&answer), "{problem} = {answer}");
            if problem.operator == Operator::Divide {
                assert_eq!(problem.left % problem.right, 0, "{problem}");
            }
            assert!(OPERAND_RANGE.contains(&problem.right), "{problem}");
        }
    }

    #[test]
    fn test_every_operator_is_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1_000 {
            seen.insert(generate(&mut rng).operator);
        }
        assert_eq!(seen.len(), Operator::ALL.len());
    }

    #[test]
    fn test_subtraction_never_negative() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..2_000 {
            let problem = MathProblem::sample(&mut rng);
            if problem.operator == Operator::Subtract {
                assert!(problem.left >= problem.right);
            }
        }
    }
}
