/*!

This is the long-form manual for `social_choice` and `scvote`.

## Values and preferences

Every agent gives a numeric value to every alternative. The values of one agent
define its preferences: the alternative with the highest value comes first.
Equal values are ordered by increasing alternative id, so that the preferences
are always a strict order.

The values are given as a table with one row per agent and one column per alternative.
Agents and alternatives are numbered from 0, following the rows and the columns.

## Rules

The following rules are supported:
* `dictatorship` The favourite alternative of the dictator (an agent) wins.
* `plurality` One point for the first alternative of every agent.
* `veto` One point for every alternative, except the last one of every agent.
* `borda` `m-1` points for the first alternative, `m-2` for the second, and so on down to 0.
* `harmonic` `1/(k+1)` points for the alternative at rank `k` (starting from 0).
* `scoring` A generic score vector, one entry per rank. It must not increase.
* `range` The sum of the values themselves. All the values must lie within the given bounds,
  otherwise the election fails.
* `stv` Single transferable vote with the Droop quota `floor(n / (seats + 1)) + 1`.

For all the scoring rules, the alternatives whose score equals the maximum, up to the
rounding error of the sums, are tied and the tiebreak mode picks the winner.

### `stv`

At every round, the ballots count for their first alternative that is still running.
An alternative that reaches the quota is elected. If more seats remain to be filled,
its surplus is transferred: every ballot for this alternative keeps the fraction
`(count - quota) / count` of its weight and moves to its next alternative.
If no alternative reaches the quota, the alternative with the lowest count is eliminated
and its ballots move to their next alternative. A ballot without any alternative left
is exhausted.

When no more alternatives are running than seats to fill, they are all elected. In
particular with one seat, the last running alternative wins whatever its count.
The election fails if all the ballots are exhausted before all the seats are filled.

## Tiebreak modes

* `max` The alternative with the largest id wins the tie.
* `min` The alternative with the smallest id wins the tie.
* `random` A draw based on a seed. The same seed always gives the same draws.
* `agent` The preferences of the given agent decide.

When a tie must be broken to eliminate an alternative (`stv`), the least favoured
alternative is eliminated: the smallest id with `max`, the largest id with `min`,
the last ranked alternative of the agent with `agent`.

## Input formats

### csv

The first row contains the names of the alternatives, the following rows contain
the values of the agents.

```text
id,Anna,Bob,Carl
a1,3,2,1
a2,1,3,2
```

The `id` column is optional: use `firstValueColumnIndex` to skip it. The header is optional
as well (`hasHeader` or `--no-header`). Without header, alternatives are named after their index.

### xlsx

The same layout, in an Excel spreadsheet. If the workbook contains several worksheets,
the name of the worksheet must be given with `excelWorksheetName` or `--excel-worksheet-name`.

## Configuration

`scvote` can be used with command line options only, or with a configuration file in JSON.
The options of the command line override the configuration file.

```json
{
  "outputSettings": {"contestName": "Board election", "outputPath": "summary.json"},
  "inputSource": {"provider": "csv", "filePath": "values.csv",
                  "firstValueColumnIndex": 2, "hasHeader": true},
  "rules": {"rule": "stv", "tiebreakMode": "random", "randomSeed": "42",
            "numberOfWinners": 2}
}
```

The paths are relative to the directory of the configuration file.

Options for `inputSource`:
 - `provider` (`csv` or `xlsx`, optional): guessed from the extension of the file if missing.
 - `firstValueColumnIndex` (number, string or Excel column name, optional): the column of the
   first value, starting from 1.

Options for `rules`:
 - `rule` (default `plurality`)
 - `tiebreakMode` (default `max`), `randomSeed` for `random`, `tiebreakAgent` for `agent`
 - `dictator` for `dictatorship`
 - `scoreVector` for `scoring`
 - `rangeMin` and `rangeMax` for `range`
 - `numberOfWinners` (default 1) for `stv`

## Summary

The summary lists the winners, the alternatives tied before the tiebreak and the scores.
For `stv`, it also contains the quota and the tally of every round with the elected and
eliminated alternatives and the transfers of their votes.

 */
