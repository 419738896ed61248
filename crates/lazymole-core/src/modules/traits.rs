use super::solver::CapturedOutput;
use crate::domain::MoleResult;
use std::path::Path;

/// Runs the external connectivity solver against a prepared run directory.
pub trait SolverRunner {
    fn invoke(&self, run_dir: &Path) -> MoleResult<CapturedOutput>;
}

impl<T> SolverRunner for &T
where
    T: SolverRunner + ?Sized,
{
    fn invoke(&self, run_dir: &Path) -> MoleResult<CapturedOutput> {
        (**self).invoke(run_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::SolverRunner;
    use crate::domain::{MoleError, MoleErrorCategory};
    use crate::modules::solver::CapturedOutput;
    use std::path::Path;

    struct MissingSolver;

    impl SolverRunner for MissingSolver {
        fn invoke(&self, _run_dir: &Path) -> crate::domain::MoleResult<CapturedOutput> {
            Err(MoleError::solver_invocation(
                "RUN.SOLVER_SPAWN",
                "solver executable not found",
            ))
        }
    }

    fn invoke_generic<S: SolverRunner>(solver: S) -> crate::domain::MoleResult<CapturedOutput> {
        solver.invoke(Path::new("run"))
    }

    #[test]
    fn runner_errors_keep_their_category() {
        let error = MissingSolver
            .invoke(Path::new("run"))
            .expect_err("runner should fail");
        assert_eq!(error.category(), MoleErrorCategory::SolverInvocation);
        assert_eq!(error.exit_code(), 5);
    }

    #[test]
    fn references_to_runners_are_runners() {
        let solver = MissingSolver;
        let error = invoke_generic(&solver).expect_err("borrowed runner should fail too");
        assert_eq!(error.code(), "RUN.SOLVER_SPAWN");
    }
}
