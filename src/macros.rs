#[macro_export]
macro_rules! assert_f64_approx {
    ($l:expr, $r:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}",
            $l,
            $r
        )
    };
    ($l:expr, $r:expr, $msg:expr) => {
        assert!(
            ($l - $r).abs() < f64::EPSILON,
            "assertion failed: {} !~ {}: {}",
            $l,
            $r,
            $msg
        )
    };
}

/// Compare two f64 slices element by element, within `tol` (default f64::EPSILON)
#[macro_export]
macro_rules! assert_slice_approx {
    ($a:expr, $b:expr) => {
        $crate::assert_slice_approx!($a, $b, f64::EPSILON)
    };
    ($a:expr, $b:expr, $tol:expr) => {{
        let (a, b) = (&$a, &$b);
        assert_eq!(a.len(), b.len(), "slices have different lengths");
        for (i, (l, r)) in a.iter().zip(b.iter()).enumerate() {
            let diff: f64 = (l - r).abs();
            assert!(diff <= $tol, "[{}]: {} != {} (diff: {})", i, l, r, diff);
        }
    }};
}
