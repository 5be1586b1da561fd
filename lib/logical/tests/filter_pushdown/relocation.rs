use crate::test_utils::{aggressive, iri, pattern, push_down, quad, var, var_expr};
use rdf_federation_common::{
    DFResult, FilterPushdownConfig, QueryContext, SelectorShape, StaticQuerySource,
};
use rdf_federation_logical::algebra::{Expression, Operation, Operator, QuadPattern};
use rdf_federation_model::Literal;

#[tokio::test]
async fn test_push_into_project() -> DFResult<()> {
    let operation = Operation::filter(
        Operation::project(Operation::bgp(Vec::new()), vec![var("s"), var("p")]),
        var_expr("s"),
    );

    let result = push_down(operation, &aggressive()).await?;

    assert_eq!(
        result,
        Operation::project(
            Operation::filter(Operation::bgp(Vec::new()), var_expr("s")),
            vec![var("s"), var("p")]
        )
    );
    insta::assert_snapshot!(result, @r"
    Project: ?s, ?p
      Filter: ?s
        Bgp: []
    ");
    Ok(())
}

#[tokio::test]
async fn test_push_into_fully_overlapping_join_inputs() -> DFResult<()> {
    let operation = Operation::filter(
        Operation::join(vec![pattern("s", "p", "o1"), pattern("s", "p2", "o2")]),
        var_expr("s"),
    );

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Filter: ?s
        Pattern: ?s ?p ?o1
      Filter: ?s
        Pattern: ?s ?p2 ?o2
    ");
    Ok(())
}

#[tokio::test]
async fn test_push_equality_into_pattern() -> DFResult<()> {
    let operation = Operation::filter(
        pattern("s", "p", "o1"),
        Expression::equal(var_expr("s"), Expression::term(iri("iri:s"))),
    );

    let result = push_down(operation, &QueryContext::default()).await?;

    assert_eq!(
        result,
        Operation::join(vec![
            Operation::pattern(QuadPattern::new(iri("iri:s"), var("p"), var("o1"))),
            Operation::values(vec![var("s")], vec![vec![Some(iri("iri:s").into())]]),
        ])
    );
    insta::assert_snapshot!(result, @r"
    Join
      Pattern: <iri:s> ?p ?o1
      Values: ?s (<iri:s>)
    ");
    Ok(())
}

#[tokio::test]
async fn test_push_equality_into_pattern_keeps_source() -> DFResult<()> {
    let source = StaticQuerySource::new("src", SelectorShape::pattern()).into_annotation();
    let operation = Operation::filter(
        Operation::pattern_from(quad("s", "p", "o"), source),
        Expression::equal(Expression::term(iri("iri:s")), var_expr("s")),
    );

    let result = push_down(operation, &QueryContext::default()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Pattern: <iri:s> ?p ?o @src
      Values: ?s (<iri:s>)
    ");
    Ok(())
}

#[tokio::test]
async fn test_equality_into_pattern_disabled() -> DFResult<()> {
    let context = QueryContext::default().with_filter_pushdown(
        FilterPushdownConfig::default().with_push_equality_into_patterns(false),
    );
    let operation = Operation::filter(
        pattern("s", "p", "o"),
        Expression::equal(var_expr("s"), Expression::term(iri("iri:s"))),
    );

    let result = push_down(operation.clone(), &context).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_numeric_equality_is_not_substituted() -> DFResult<()> {
    let operation = Operation::filter(
        pattern("s", "p", "o"),
        Expression::equal(var_expr("o"), Expression::term(Literal::from(1_i32))),
    );

    let result = push_down(operation.clone(), &QueryContext::default()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_false_filter_empties_operation() -> DFResult<()> {
    let operation = Operation::filter(
        Operation::join(vec![pattern("s", "p", "o1"), pattern("s", "p2", "o2")]),
        Expression::term(Literal::from(false)),
    );

    let result = push_down(operation, &aggressive()).await?;

    assert_eq!(result, Operation::empty());
    Ok(())
}

#[tokio::test]
async fn test_false_filter_in_join_input() -> DFResult<()> {
    let operation = Operation::join(vec![
        Operation::filter(pattern("s", "p", "o1"), Expression::term(Literal::from(false))),
        pattern("s", "p2", "o2"),
    ]);

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Union
      Pattern: ?s ?p2 ?o2
    ");
    Ok(())
}

#[tokio::test]
async fn test_filter_on_projected_away_variables_is_removed() -> DFResult<()> {
    let project = Operation::project(pattern("s", "p", "o"), vec![var("s")]);
    let operation = Operation::filter(project.clone(), var_expr("x"));

    let result = push_down(operation, &aggressive()).await?;
    assert_eq!(result, project);

    let again = push_down(result, &aggressive()).await?;
    assert_eq!(again, project);
    Ok(())
}

#[tokio::test]
async fn test_values() -> DFResult<()> {
    let values = Operation::values(vec![var("s")], vec![vec![Some(iri("iri:s").into())]]);

    let kept = Operation::filter(values.clone(), var_expr("s"));
    assert_eq!(push_down(kept.clone(), &aggressive()).await?, kept);

    let removed = Operation::filter(values.clone(), var_expr("x"));
    assert_eq!(push_down(removed, &aggressive()).await?, values);
    Ok(())
}

#[tokio::test]
async fn test_filter_on_nop_is_removed() -> DFResult<()> {
    let operation = Operation::filter(Operation::Nop, var_expr("s"));

    let result = push_down(operation, &aggressive()).await?;

    assert_eq!(result, Operation::Nop);
    Ok(())
}

#[tokio::test]
async fn test_push_through_extend() -> DFResult<()> {
    let extend = Operation::extend(pattern("s", "p", "o"), var("x"), var_expr("o"));

    let result = push_down(Operation::filter(extend.clone(), var_expr("s")), &aggressive()).await?;
    insta::assert_snapshot!(result, @r"
    Extend: ?x := ?o
      Filter: ?s
        Pattern: ?s ?p ?o
    ");

    let on_extended = Operation::filter(extend, var_expr("x"));
    assert_eq!(push_down(on_extended.clone(), &aggressive()).await?, on_extended);
    Ok(())
}

#[tokio::test]
async fn test_push_into_left_join() -> DFResult<()> {
    let left_join =
        Operation::left_join(pattern("s", "p", "o"), pattern("o", "q", "x"), None);

    let result = push_down(Operation::filter(left_join.clone(), var_expr("s")), &aggressive()).await?;
    assert_eq!(
        result,
        Operation::left_join(
            Operation::filter(pattern("s", "p", "o"), var_expr("s")),
            pattern("o", "q", "x"),
            None
        )
    );

    let on_optional = Operation::filter(left_join.clone(), var_expr("x"));
    assert_eq!(push_down(on_optional.clone(), &aggressive()).await?, on_optional);

    let disabled = aggressive().with_filter_pushdown(
        FilterPushdownConfig::default()
            .with_aggressive_pushdown(true)
            .with_push_into_left_joins(false),
    );
    let operation = Operation::filter(left_join, var_expr("s"));
    assert_eq!(push_down(operation.clone(), &disabled).await?, operation);
    Ok(())
}

#[tokio::test]
async fn test_push_into_union() -> DFResult<()> {
    let operation = Operation::filter(
        Operation::union(vec![pattern("s", "p", "o"), pattern("s", "q", "x")]),
        var_expr("s"),
    );

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Union
      Filter: ?s
        Pattern: ?s ?p ?o
      Filter: ?s
        Pattern: ?s ?q ?x
    ");
    Ok(())
}

#[tokio::test]
async fn test_push_into_union_by_overlap() -> DFResult<()> {
    let same_term = Expression::operator(Operator::SameTerm, vec![var_expr("a"), var_expr("b")]);
    let operation = Operation::filter(
        Operation::union(vec![
            pattern("a", "b", "o"),
            pattern("a", "x", "y"),
            pattern("x", "y", "z"),
        ]),
        same_term,
    );

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Union
      Filter: sameTerm(?a, ?b)
        Pattern: ?a ?b ?o
      Filter: sameTerm(?a, ?b)
        Pattern: ?a ?x ?y
      Pattern: ?x ?y ?z
    ");
    Ok(())
}

#[tokio::test]
async fn test_filter_on_empty_union_is_removed() -> DFResult<()> {
    let operation = Operation::filter(Operation::empty(), var_expr("s"));

    let result = push_down(operation, &aggressive()).await?;

    assert_eq!(result, Operation::empty());
    Ok(())
}

#[tokio::test]
async fn test_false_filter_empties_every_operation() -> DFResult<()> {
    let operations = [
        Operation::project(pattern("s", "p", "o"), vec![var("s")]),
        Operation::union(vec![pattern("s", "p", "o"), pattern("x", "y", "z")]),
        Operation::left_join(pattern("s", "p", "o"), pattern("o", "q", "x"), None),
        Operation::extend(pattern("s", "p", "o"), var("x"), var_expr("o")),
        Operation::values(vec![var("s")], vec![vec![Some(iri("iri:s").into())]]),
    ];

    for operation in operations {
        let filtered = Operation::filter(operation, Expression::term(Literal::from(false)));
        assert_eq!(push_down(filtered, &aggressive()).await?, Operation::empty());
    }
    Ok(())
}

#[tokio::test]
async fn test_nested_false_filters_are_absorbed() -> DFResult<()> {
    let never = || Expression::term(Literal::from(false));
    let values = Operation::values(vec![var("s")], vec![vec![Some(iri("iri:s").into())]]);
    let operation = Operation::union(vec![
        Operation::project(Operation::filter(pattern("s", "p", "o"), never()), vec![var("s")]),
        Operation::extend(
            Operation::filter(pattern("s", "p", "o"), never()),
            var("x"),
            var_expr("o"),
        ),
        Operation::left_join(
            Operation::filter(pattern("s", "p", "o"), never()),
            pattern("o", "q", "x"),
            None,
        ),
        Operation::filter(values, never()),
    ]);

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Union
      Project: ?s
        Union
      Extend: ?x := ?o
        Union
      LeftJoin
        Union
        Pattern: ?o ?q ?x
      Union
    ");
    Ok(())
}

#[tokio::test]
async fn test_extension_function_filter_stays_above_its_arguments() -> DFResult<()> {
    let function = || {
        Expression::named_function(iri("http://example.com/fn"), vec![var_expr("s")])
    };

    let project = Operation::filter(
        Operation::project(pattern("s", "p", "o"), vec![var("s")]),
        function(),
    );
    insta::assert_snapshot!(push_down(project, &aggressive()).await?, @r"
    Project: ?s
      Filter: <http://example.com/fn>(?s)
        Pattern: ?s ?p ?o
    ");

    let join = Operation::filter(
        Operation::join(vec![pattern("s", "p", "o"), pattern("x", "y", "z")]),
        function(),
    );
    insta::assert_snapshot!(push_down(join, &aggressive()).await?, @r"
    Join
      Filter: <http://example.com/fn>(?s)
        Pattern: ?s ?p ?o
      Pattern: ?x ?y ?z
    ");
    Ok(())
}

#[tokio::test]
async fn test_constant_filters_are_kept() -> DFResult<()> {
    let constant = || {
        Expression::equal(
            Expression::term(Literal::from(1_i32)),
            Expression::term(Literal::from(2_i32)),
        )
    };
    let values = Operation::values(vec![var("s")], vec![vec![Some(iri("iri:s").into())]]);

    let operations = [
        Operation::filter(
            Operation::project(pattern("s", "p", "o"), vec![var("s")]),
            constant(),
        ),
        Operation::filter(values, constant()),
        Operation::filter(
            Operation::join(vec![pattern("s", "p", "o"), pattern("x", "y", "z")]),
            constant(),
        ),
    ];

    for operation in operations {
        assert_eq!(push_down(operation.clone(), &aggressive()).await?, operation);
    }
    Ok(())
}

#[tokio::test]
async fn test_partially_overlapping_join_input_is_not_filtered() -> DFResult<()> {
    let same_term = Expression::operator(Operator::SameTerm, vec![var_expr("a"), var_expr("b")]);
    let operation = Operation::filter(
        Operation::join(vec![pattern("a", "b", "o"), pattern("a", "x", "y")]),
        same_term,
    );

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Filter: sameTerm(?a, ?b)
        Pattern: ?a ?b ?o
      Pattern: ?a ?x ?y
    ");
    Ok(())
}

#[tokio::test]
async fn test_only_partially_overlapping_join_inputs() -> DFResult<()> {
    let same_term = Expression::operator(Operator::SameTerm, vec![var_expr("a"), var_expr("b")]);
    let operation = Operation::filter(
        Operation::join(vec![pattern("a", "p", "o"), pattern("b", "q", "x")]),
        same_term,
    );

    let result = push_down(operation.clone(), &aggressive()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_exists_is_not_pushed() -> DFResult<()> {
    let exists = Expression::Exists {
        operation: Box::new(pattern("s", "q", "z")),
        negated: false,
    };
    let operation = Operation::filter(
        Operation::join(vec![pattern("s", "p", "o1"), pattern("s", "p2", "o2")]),
        exists,
    );

    let result = push_down(operation.clone(), &aggressive()).await?;

    assert_eq!(result, operation);
    Ok(())
}

#[tokio::test]
async fn test_conjuncts_are_pushed_independently() -> DFResult<()> {
    let operation = Operation::filter(
        Operation::join(vec![pattern("a", "p", "o"), pattern("b", "q", "x")]),
        Expression::and(var_expr("a"), var_expr("b")),
    );

    let result = push_down(operation, &aggressive()).await?;

    insta::assert_snapshot!(result, @r"
    Join
      Filter: ?b
        Pattern: ?b ?q ?x
      Filter: ?a
        Pattern: ?a ?p ?o
    ");
    Ok(())
}

#[tokio::test]
async fn test_stacked_filters_are_merged_in_order() -> DFResult<()> {
    let operation = Operation::filter(
        pattern("a", "b", "c"),
        Expression::and(var_expr("a"), var_expr("b")),
    );

    let result = push_down(operation.clone(), &aggressive()).await?;

    assert_eq!(result, operation);
    insta::assert_snapshot!(result, @r"
    Filter: (?a && ?b)
      Pattern: ?a ?b ?c
    ");
    Ok(())
}

#[tokio::test]
async fn test_zero_iterations() -> DFResult<()> {
    let context = QueryContext::default().with_filter_pushdown(
        FilterPushdownConfig::default()
            .with_aggressive_pushdown(true)
            .with_max_iterations(0),
    );
    let operation = Operation::filter(
        Operation::join(vec![pattern("s", "p", "o1"), pattern("s", "p2", "o2")]),
        var_expr("s"),
    );

    let result = push_down(operation.clone(), &context).await?;

    assert_eq!(result, operation);
    Ok(())
}
