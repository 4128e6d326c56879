use grid_linalg::*;

#[test]
fn world_of_seven_is_rejected() {
    // the constructor must fail before any matrix is allocated
    let results = comm::run_world(7, |world| Square::new(world).err());
    for err in results {
        match err {
            Some(LinalgError::NotCubic { size }) => assert_eq!(size, 7),
            other => panic!("expected NotCubic, got {:?}", other),
        }
    }
}

#[test]
fn tunable_rejects_non_dividing_replication() {
    // 12 = d*c*c with c = 2 gives d = 3, and 2 does not divide 3
    let results = comm::run_world(12, |world| Rect::new(world, 2).err());
    for err in results {
        match err {
            Some(LinalgError::InvalidReplication { size, c }) => {
                assert_eq!((size, c), (12, 2));
            }
            other => panic!("expected InvalidReplication, got {:?}", other),
        }
    }
}

#[test]
fn tunable_rejects_replication_above_d() {
    // 18 = d*c*c with c = 3 gives d = 2 < c
    let results = comm::run_world(18, |world| Rect::new(world, 3).err());
    for err in results {
        assert!(matches!(
            err,
            Some(LinalgError::InvalidReplication { size: 18, c: 3 })
        ));
    }
}

#[test]
fn tunable_extremes_degenerate_cleanly() {
    // c = d: the cubic grid
    comm::run_world(8, |world| {
        let topo = Rect::new(world, 2).unwrap();
        assert_eq!(topo.d, 2);
        assert_eq!(topo.cube.size(), 8);
        assert_eq!(topo.column_alt.size(), 1);
    });
    // c = 1: a one-dimensional column of ranks
    comm::run_world(5, |world| {
        let topo = Rect::new(world, 1).unwrap();
        assert_eq!(topo.d, 5);
        assert_eq!(topo.row.size(), 1);
        assert_eq!(topo.column_contig.size(), 1);
        assert_eq!(topo.column_alt.size(), 5);
        assert_eq!(topo.cube.size(), 1);
        assert_eq!(topo.depth.size(), 1);
    });
}

#[test]
fn cube_comm_rebuilds_a_square_topology() {
    comm::run_world(16, |world| {
        let topo = Rect::new(world, 2).unwrap();
        let sq = Square::new(topo.cube.dup()).unwrap();
        assert_eq!(sq.d, 2);
        assert_eq!(sq.x, topo.x);
        assert_eq!(sq.y, topo.y % 2);
        assert_eq!(sq.z, topo.z);
    });
}
