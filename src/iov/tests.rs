// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::*;

fn iov(s: &str) -> Iov {
    s.parse().unwrap()
}

#[test]
fn test_parse_and_display() {
    for s in ["0,0,-1,-1", "12,0,12,-1", "12,5,14,100", "-1,-1,-1,-1"] {
        assert_eq!(iov(s).to_string(), s);
    }
    // An open low run starts at run 0.
    assert_eq!(iov("12,-1,12,-1").to_string(), "12,0,12,-1");

    assert!("1,2,3".parse::<Iov>().is_err());
    assert!("a,0,1,1".parse::<Iov>().is_err());
    // Backwards.
    assert!("5,0,4,0".parse::<Iov>().is_err());
    assert!("-2,0,4,0".parse::<Iov>().is_err());
}

#[test]
fn test_parse_exp_run() {
    assert_eq!("12,345".parse::<ExpRun>().unwrap(), ExpRun::new(12, 345));
    assert_eq!(" 3:4 ".parse::<ExpRun>().unwrap(), ExpRun::new(3, 4));
    assert!("12".parse::<ExpRun>().is_err());
    assert!("12,3,4".parse::<ExpRun>().is_err());
    assert!("-1,3".parse::<ExpRun>().is_err());
}

#[test]
fn test_contains() {
    let i = iov("12,5,13,-1");
    assert!(i.contains(ExpRun::new(12, 5)));
    assert!(i.contains(ExpRun::new(13, 99_999)));
    assert!(!i.contains(ExpRun::new(12, 4)));
    assert!(!i.contains(ExpRun::new(14, 0)));
    assert!(Iov::always().contains(ExpRun::new(1_000, 1_000)));
}

#[test]
fn test_intersection() {
    let a = iov("0,0,-1,-1");
    let b = iov("12,10,12,20");
    assert_eq!(a.intersection(&b), Some(b));
    assert_eq!(b.intersection(&a), Some(b));

    let c = iov("12,15,13,0");
    assert_eq!(b.intersection(&c), Some(iov("12,15,12,20")));

    let d = iov("12,21,12,30");
    assert_eq!(b.intersection(&d), None);
    assert!(!b.overlaps(&d));

    // Touching at a single run still overlaps.
    let e = iov("12,20,12,30");
    assert_eq!(b.intersection(&e), Some(Iov::single_run(ExpRun::new(12, 20))));
}

#[test]
fn test_spanning() {
    let runs = vec![
        ExpRun::new(12, 30),
        ExpRun::new(12, 3),
        ExpRun::new(11, 400),
    ];
    assert_eq!(Iov::spanning(&runs), Some(iov("11,400,12,30")));
    assert_eq!(runs.data_iov(), Some(iov("11,400,12,30")));
    assert_eq!(Iov::spanning(&[] as &[ExpRun]), None);
    assert_eq!(Vec::<ExpRun>::new().data_iov(), None);
}

#[test]
fn test_clipped_around() {
    let wide = iov("12,0,12,-1");
    let nested = iov("12,0,12,10");
    // Runs after the nested interval keep only what's after it.
    assert_eq!(
        wide.clipped_around(&nested, ExpRun::new(12, 15)),
        iov("12,11,12,-1")
    );
    // Runs before a later interval keep only what's before it.
    assert_eq!(
        wide.clipped_around(&iov("12,20,12,30"), ExpRun::new(12, 15)),
        iov("12,0,12,19")
    );
    // Clipping at experiment boundaries.
    assert_eq!(
        iov("-1,-1,-1,-1").clipped_around(&iov("12,0,12,-1"), ExpRun::new(13, 2)),
        iov("13,0,-1,-1")
    );
    assert_eq!(
        iov("-1,-1,-1,-1").clipped_around(&iov("12,0,12,-1"), ExpRun::new(11, 2)),
        iov("-1,-1,11,-1")
    );
    // Nothing to do if the other interval doesn't overlap.
    assert_eq!(
        nested.clipped_around(&iov("12,20,12,30"), ExpRun::new(12, 5)),
        nested
    );

    let effective = wide.effective(
        [nested, iov("12,30,-1,-1")],
        ExpRun::new(12, 15),
    );
    assert_eq!(effective, iov("12,11,12,29"));
}
