//! Test utilities.

/// Asserts that the receiver got the chosen message of every transfer.
pub fn assert_ot<T>(choices: &[bool], msgs: &[[T; 2]], received: &[T])
where
    T: PartialEq + std::fmt::Debug,
{
    assert_eq!(choices.len(), msgs.len());
    assert_eq!(choices.len(), received.len());

    for ((choice, [zero, one]), received) in choices.iter().zip(msgs).zip(received) {
        let expected = if *choice { one } else { zero };
        assert_eq!(received, expected);
    }
}
