/*!

This is the long-form manual for `instant_runoff` and `irvflow`.

## Counting rules

Each ballot ranks some of the candidates, most preferred first. In every round, a ballot counts as one vote for
its highest-ranked candidate that is still in the race.

- A candidate with strictly more than half of the votes of the round wins. Exactly half is not enough.
- When a single candidate is left, it wins, even without any vote.
- Otherwise every candidate with the lowest number of votes is eliminated. There is no tie-breaking: when
  several candidates share the lowest count, they all go. If this removes everybody, the election is a tie.
- A ballot whose ranked candidates are all eliminated is exhausted and counts in no further round.

After every elimination, the votes of the next round are recorded in a ledger: for each candidate of
round `r`, where its votes were in round `r - 1`. Votes that did not move are recorded too, with the same
candidate as source and destination.

Two situations are left to the [`VoteRules`](crate::VoteRules):
- `unrankedCandidates`: registered candidates that no ballot ranks either take part in the first
  elimination with zero votes (`participate`, the default) or are removed beforehand (`exclude`).
- `degenerateRound`: when no ballot holds a vote while several candidates are running, the election
  ends in a tie (`tie`, the default) or fails (`fail`).

## Input formats

The following formats are supported:
* `csv` Comma Separated Values, one column per rank
* `csv_likert` Comma Separated Values, one column per candidate (Google Forms, Microsoft Forms, Qualtrics)
* `msforms_likert` the same layout in an Excel workbook

### csv

Simple CSV reader. Each column (in order) is considered to be a choice. The name of the choice in the header is not significant.

```text
id,count,choice 1,choice 2,choice 3,choice 4
id1,20,A,B,C,D
id2,20,A,C,B,D
```

The `id` and `count` columns are optional. Headers in the first row are optional.
The candidates must be provided, with `--candidates` or in the configuration file.
Empty cells are skipped, so `A,,B` is the same ballot as `A,B`. A name that is not a candidate is an error.

See the [Configuration section](#configuration) on controlling the optional rows and columns.

### csv_likert

CSV reader sorted by candidates. This is the export of grid questions in Google Forms and of Likert
questions in Microsoft Forms. The file is expected to look as follows:

```text
Timestamp,A,B,C,D
2023/10/01 10:00:00,1st,2nd,3rd,
2023/10/01 10:05:00,1st,3rd,2nd,4th
```

The header is the row just before the first ballot. The cells below a candidate are the ranks given to this
candidate (or empty if this candidate was not ranked). Ranks are ordinals (`1st`, `2nd`, `3`) unless the
labels of the choices are provided. A rank above the number of candidates (or above the number of choices
when they are provided) is an error.

When no candidates are provided, they are the names of the header, starting from the second column.
Two candidates given the same rank on a ballot is an error.

### msforms_likert

Same as `csv_likert`, read from an Excel workbook (.xlsx). When the workbook has several worksheets, the name of
the worksheet must be given with `--excel-worksheet-name`.

## Output

The results of every round are printed, followed by the winner. With `--out`, a summary of the election is
written in JSON:

- `config`: the name and date of the contest and the candidates
- `winner` and `outcome`: how the election ended (`majority`, `soleSurvivor` or `tie`)
- `rounds`: the tally (`[candidate, votes]` pairs, most votes first), the number of votes, the exhausted
  ballots and the eliminated candidates of every round
- `transfers`: the records of the ledger, `{ round, destination, source, count }`, by round
- `flow`: the nodes (`Round r, Candidate c`) and the links of a flow diagram of the votes

With `--reference`, the summary is compared with a previously computed one. Any difference is printed and
makes the program fail.

## Configuration

`irvflow` comes with sensible defaults. The command line describes an election with a single input file.
For other cases, the program accepts a configuration file in JSON, inspired by the configuration of the
[RCVTab program](https://github.com/BrightSpots/rcv/blob/develop/config_file_documentation.txt).

```json
{
  "outputSettings": { "contestName": "Board", "contestDate": "2023-10-01", "outputFile": "summary.json" },
  "cvrFileSources": [
    { "provider": "csv", "filePath": "ballots.csv", "firstVoteRowIndex": 2, "idColumnIndex": "A", "countColumnIndex": 2 }
  ],
  "candidates": [ { "name": "A" }, { "name": "B" }, { "name": "C" } ],
  "rules": { "unrankedCandidates": "participate", "degenerateRound": "tie" }
}
```

Paths are relative to the configuration file. The ballots of all the sources are counted together.

OutputSettings:
 - `contestName` (string): the name of the election.
 - `contestDate` (string, optional).
 - `outputFile` (string, optional): where to write the summary, or `stdout`.

FileSource:
 - `provider` (string): one of the input formats.
 - `filePath` (string).
 - `firstVoteColumnIndex` (string or number, optional): the first column with choices. Columns are counted
   from 1 or named as in a spreadsheet (`A`, `B`, ...).
 - `firstVoteRowIndex` (string or number, optional): the first row with a ballot, counted from 1.
 - `idColumnIndex` (string or number, optional): the column with the ids of the ballots.
 - `countColumnIndex` (string or number, optional): the location of the column that
   indicates the counts. If not provided, every ballot will be assigned a count of 1.
 - `excelWorksheetName` (string, optional): for Excel-based inputs, the name of
   the worksheet in Excel.
 - `choices` (array of strings, optional): The list of labels for the choices. For example, if
   the list is `["First choice", "Second choice"]`, then seeing `First choice` will be
   interpreted as choice #1, and so on.

Candidates are optional for the likert formats. The rules given on the command line replace the rules of the
configuration file.

 */
