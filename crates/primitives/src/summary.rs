/// A trait for objects that can be summarized into a string for logging purposes.
///
/// Sometimes the Debug impl is too verbose, and the Display impl does something different
/// than what we want. This trait allows us to have our custom verbosity.
pub trait Summary {
    /// Returns a summary of the object.
    fn summary(&self) -> String;
}

impl<T: Summary> Summary for [T] {
    fn summary(&self) -> String {
        let items = self.iter().map(Summary::summary).collect::<Vec<_>>();
        format!("[{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::Summary;

    struct Named(&'static str);

    impl Summary for Named {
        fn summary(&self) -> String {
            self.0.to_owned()
        }
    }

    #[test]
    fn summarizes_slices() {
        let items = [Named("a"), Named("b")];
        assert_eq!(items.summary(), "[a, b]");
        assert_eq!(Vec::<Named>::new().summary(), "[]");
    }
}
